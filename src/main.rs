use tab_grid::cli;

fn main() {
    match cli::process_cli() {
        Ok(cli::CliResult::Exit(code)) => std::process::exit(code),
        Err(e) => {
            eprintln!("tab-grid: error: {e:#}");
            std::process::exit(1);
        }
    }
}
