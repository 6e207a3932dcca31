use scapple_rs::error::ScappleError;

fn main() {
    if let Err(err) = scapple_rs::run() {
        match err.downcast_ref::<ScappleError>() {
            Some(err) => eprintln!("error: {}", err.to_report()),
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
}
