
fn main() {
    wordspace::Pipeline::run();
}
