fn main() {
    if let Err(err) = field_catalog_search::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
