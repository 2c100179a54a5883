fn main() {
    if let Err(err) = quicksketch_lib::run() {
        eprintln!("quicksketch: {err:#}");
        std::process::exit(1);
    }
}
