// The loader looks for `CONSOLAR_PLUGIN_MODULE`; this library exports a
// differently named symbol, so the import fails at lookup.
#[unsafe(no_mangle)]
pub static CONSOLAR_PLUGIN: u32 = 0;

#[unsafe(no_mangle)]
pub extern "C" fn consolar_plugin_initialize_incorrectly() -> u32 {
    CONSOLAR_PLUGIN
}
