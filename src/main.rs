use craton::{CratonError, Shell};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let shell = Shell::from_config_file();

    match shell.dispatch(std::env::args_os().skip(1)).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(CratonError::Usage(err)) => {
            let code = err.exit_code();
            let _ = err.print();
            exit_code(code)
        }
        Err(err) => {
            eprintln!("ERROR: {}", err);
            exit_code(err.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
