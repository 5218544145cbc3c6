use std::process::ExitCode;
use toyelgamal::{Mode, SchemeConfig, Session, SessionError};
use tracing_subscriber::EnvFilter;

fn run() -> Result<(), SessionError> {
    let mut mode = Mode::Insecure;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--secure" => mode = Mode::Secure,
            _ => path = Some(arg),
        }
    }

    let mut session = Session::new(SchemeConfig::default());
    if let Some(path) = path {
        session.load_file(path)?;
    }

    let keys = session.set_mode(mode)?;
    let public_key = keys.get_public_key();
    println!("mode: {}", mode);
    println!("p: {:x}", keys.domain().p());
    println!("g: {}", keys.domain().g());
    println!("private key: {:x}", keys.exponent());
    println!("public key: {:x}", public_key.value());

    let document = session.sign()?;
    println!("signed {}", document.name);
    println!("{}", document.signature);
    let verification_result = session.verify(&document)?;
    println!("verification result: {}", verification_result);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toyelgamal=info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
