//! `restdoc` binary entry point.

fn main() {
    let code = restdoc_cli::run(std::env::args().collect());
    std::process::exit(code);
}
