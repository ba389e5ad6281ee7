fn main() {
    if let Err(e) = diacare_lib::run() {
        eprintln!("DiaCare failed to start: {e}");
        std::process::exit(1);
    }
}
