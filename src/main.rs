fn main() {
    if let Err(err) = deskchat::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
