use std::process::ExitCode;

fn main() -> ExitCode {
    jcsh::lib_main()
}
