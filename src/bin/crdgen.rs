//! Prints the `LoggingSetup` CRD YAML to stdout.

fn main() {
    match logging_setup_controller::controller::crdgen::crd_yaml() {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => {
            eprintln!("Failed to serialize CRD to YAML: {e}");
            std::process::exit(1);
        }
    }
}
