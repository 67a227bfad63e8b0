//! lotbook-basis - FIFO cost basis of an exchange account statement.

fn main() -> std::process::ExitCode {
    lotbook::cmd::basis_cmd::main()
}
