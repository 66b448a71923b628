fn main() {
    carebot_lib::run()
}
