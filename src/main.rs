fn main() {
    if let Err(err) = inventory_normalizer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
