fn main() {
    if let Err(e) = keepix_dashboard_lib::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
