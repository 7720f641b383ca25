//! Shared factories for unit tests.
//!
//! Canned module images covering the common rewrite scenario: the host's
//! current platform module and a plugin still carrying a legacy platform
//! reference. Integration suites build their own images through the public
//! builder; these exist for in-crate tests that want the same shapes
//! without repeating the setup.

use crate::metadata::{
    builder::ModuleBuilder,
    identity::ModuleVersion,
    tables::{MemberFlags, TypeFlags},
};
use crate::ModuleImage;

/// Signature blob of an instance method taking no arguments.
pub const RENDER_SIG: &[u8] = &[0x20, 0x00, 0x01];

// The host's current primary platform module.
pub fn platform_core() -> ModuleImage {
    ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .type_def("Host.Api", "Gadget", TypeFlags::PUBLIC)
        .member_def(1, "Render", MemberFlags::PUBLIC, RENDER_SIG)
        .build()
        .unwrap()
}

// A plugin compiled against the legacy platform name, with one reference
// the rewrite leaves alone.
pub fn legacy_plugin() -> ModuleImage {
    ModuleBuilder::new("Plugin")
        .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
        .module_ref("Third.Party", ModuleVersion::new(0, 9, 0))
        .type_ref(1, "Host.Api", "Widget")
        .type_ref(1, "Host.Api", "Gadget")
        .type_ref(2, "Third", "Helper")
        .member_ref(1, "Render", RENDER_SIG)
        .build()
        .unwrap()
}
