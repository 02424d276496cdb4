fn main() {
    lchol_tasks::entry_points::lchol(lchol::version::get());
}
