#![allow(dead_code)]

// Mirrors the layout of `consolar_core::plugin_system::PluginDeclaration`.
#[repr(C)]
pub struct PluginDeclaration {
    pub api_version: &'static str,
    pub core_version: &'static str,
    pub register: fn(&mut Registrar),
    // Host passes `&'static dyn log::Log` and a level; only the slot size matters here.
    pub install_logger: fn(),
}

/// Stand-in for the host's registrar; never dereferenced.
pub struct Registrar;

fn register(_registrar: &mut Registrar) {
    panic!("register must not run for an incompatible module");
}

fn install_logger() {
    panic!("the logger must not be installed into an incompatible module");
}

// Built against a core release the host does not accept.
#[unsafe(no_mangle)]
pub static CONSOLAR_PLUGIN_MODULE: PluginDeclaration = PluginDeclaration {
    api_version: "9.0.0",
    core_version: "0.0.0-mismatch",
    register,
    install_logger,
};
