use siren::cli::initialize_from_arguments;

/// Without arguments, main runs the default simulation
fn main() {
    println!("Siren v{}", env!("CARGO_PKG_VERSION"));
    initialize_from_arguments();
    println!("Done");
}
