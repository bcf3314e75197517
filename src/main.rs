fn main() {
    if let Err(err) = survey_groups::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
