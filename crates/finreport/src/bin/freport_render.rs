//! freport-render - Render a financial statement.

fn main() -> std::process::ExitCode {
    finreport::cmd::render::main()
}
