use clap::Parser;

fn main() {
    let cli = route_schemer_cli::Cli::parse();
    if let Err(e) = route_schemer_cli::run(cli) {
        eprintln!("{} error: {}", e.category(), e);
        if let Some(details) = e.details_json() {
            eprintln!("{details}");
        }
        for suggestion in e.suggestions() {
            eprintln!("  hint: {suggestion}");
        }
        std::process::exit(1);
    }
}
