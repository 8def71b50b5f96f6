fn main() {
    // Every failure is reported inside run(); only the status is left.
    std::process::exit(lintel::cli::run());
}
