//! Binary entrypoint for asciilab (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = asciilab_cli::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
