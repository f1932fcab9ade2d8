use siren::simulations::handshake_pair;

fn main() {
    handshake_pair()
}
