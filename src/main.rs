use driftfield::Backdrop;

fn main() {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .expect("log spec is valid")
        .start()
        .expect("logger starts");

    if let Err(e) = Backdrop::new().run() {
        log::error!("backdrop failed: {}", e);
        std::process::exit(1);
    }
}
