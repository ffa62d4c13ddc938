use crate::locks::LockingBridge;

/*
    Setup surface of a native crypto library.
      - The sequencer calls these once, in declaration order.
      - Everything except `lock_slots` is infallible by contract; an
        implementation that sees a native failure must clear its error
        queue and carry on.
*/
pub trait NativeLibrary: Send + Sync {
    fn name(&self) -> &'static str;

    fn load_config(&self, appname: Option<&str>);
    fn load_builtin_engines(&self);
    fn load_error_strings(&self);
    fn library_init(&self);
    fn add_all_algorithms(&self);

    // Raw count as the library reports it; negative means the query failed.
    fn lock_slots(&self) -> i64;

    fn install_locking_callback(&self, bridge: &'static LockingBridge);
}
