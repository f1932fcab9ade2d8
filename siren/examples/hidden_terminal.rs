use siren::simulations::hidden_terminal;

fn main() {
    hidden_terminal()
}
