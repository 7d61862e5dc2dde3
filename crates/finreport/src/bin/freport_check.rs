//! freport-check - Validate report definitions.

fn main() -> std::process::ExitCode {
    finreport::cmd::check::main()
}
