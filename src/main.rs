fn main() {
    if let Err(err) = sitescore::cli::run() {
        sitescore::ui::eprintln_error(&err);
        std::process::exit(sitescore::exit::exit_code(&err));
    }
}
