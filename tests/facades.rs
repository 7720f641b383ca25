//! Facade member mapping integration tests.
//!
//! A facade mapping repoints member reference sites at replacement members,
//! either unconditionally or gated on the original member no longer
//! resolving against the targets. These tests cover both modes, signature
//! replacement across an instance-to-static break, and the type reference
//! import that backs a redirect onto a previously unreferenced type.

use rebind::metadata::signatures::{self, TypeCode};
use rebind::prelude::*;

fn rendered(log: &RewriteLog) -> Vec<String> {
    log.iter().map(ToString::to_string).collect()
}

#[test]
fn unconditional_mapping_redirects_even_resolvable_sites() -> Result<()> {
    let getter = signatures::property(true, TypeCode::Object);
    let replacement = signatures::method(false, TypeCode::Object, &[])?;

    // The target still ships the old getter, so the original site would
    // resolve fine; an ungated mapping redirects it regardless.
    let target = ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .member_def(1, "get_Items", MemberFlags::PUBLIC | MemberFlags::PROPERTY, &getter)
        .member_def(1, "Items", MemberFlags::PUBLIC | MemberFlags::STATIC, &replacement)
        .build()?;

    let facades = FacadeMap::builder()
        .redirect(
            MemberKey::new("Host.Api.Widget", "get_Items", getter.clone()),
            MemberKey::new("Host.Api.Widget", "Items", replacement.clone()),
        )
        .finish();

    let rewriter = Rewriter::new(
        RewriterConfig::new()
            .with_target_image(target)
            .with_strip_name("Legacy.Platform")
            .with_facades(facades),
    )?;

    let mut subject = ModuleBuilder::new("Plugin")
        .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
        .type_ref(1, "Host.Api", "Widget")
        .member_ref(1, "get_Items", &getter)
        .build()?;

    let report = rewriter.rewrite(&mut subject)?;
    assert_eq!(report.member_sites_redirected, 1);

    let unit = subject.primary_unit()?;
    let site = &unit.member_refs[0];
    assert_eq!(site.name, "Items");
    assert_eq!(site.signature, replacement);
    assert_eq!(site.class, 1, "replacement lives on the same type");

    assert!(rendered(&report.log)
        .contains(&"redirecting Host.Api.Widget.get_Items to Host.Api.Widget.Items".to_string()));

    Ok(())
}

#[test]
fn gated_mapping_leaves_resolvable_sites_alone() -> Result<()> {
    let sig = signatures::method(true, TypeCode::Void, &[])?;

    // Render still exists with the site's exact signature, so the gate holds.
    let target = ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .member_def(1, "Render", MemberFlags::PUBLIC, &sig)
        .member_def(1, "Draw", MemberFlags::PUBLIC, &sig)
        .build()?;

    let facades = FacadeMap::builder()
        .redirect_if_unresolved(
            MemberKey::new("Host.Api.Widget", "Render", sig.clone()),
            MemberKey::new("Host.Api.Widget", "Draw", sig.clone()),
        )
        .finish();

    let rewriter = Rewriter::new(
        RewriterConfig::new()
            .with_target_image(target)
            .with_strip_name("Legacy.Platform")
            .with_facades(facades),
    )?;

    let mut subject = ModuleBuilder::new("Plugin")
        .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
        .type_ref(1, "Host.Api", "Widget")
        .member_ref(1, "Render", &sig)
        .build()?;

    let report = rewriter.rewrite(&mut subject)?;

    // The type walk still ran; the member site did not move.
    assert_eq!(report.type_sites_redirected, 1);
    assert_eq!(report.member_sites_redirected, 0);

    let site = &subject.primary_unit()?.member_refs[0];
    assert_eq!(site.name, "Render");
    assert_eq!(site.signature, sig);

    Ok(())
}

#[test]
fn gated_mapping_fires_when_the_member_is_gone() -> Result<()> {
    let sig = signatures::method(true, TypeCode::Void, &[])?;

    // The target dropped Render entirely; only the replacement remains.
    let target = ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .member_def(1, "Draw", MemberFlags::PUBLIC, &sig)
        .build()?;

    let facades = FacadeMap::builder()
        .redirect_if_unresolved(
            MemberKey::new("Host.Api.Widget", "Render", sig.clone()),
            MemberKey::new("Host.Api.Widget", "Draw", sig.clone()),
        )
        .finish();

    let rewriter = Rewriter::new(
        RewriterConfig::new()
            .with_target_image(target)
            .with_strip_name("Legacy.Platform")
            .with_facades(facades),
    )?;

    let mut subject = ModuleBuilder::new("Plugin")
        .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
        .type_ref(1, "Host.Api", "Widget")
        .member_ref(1, "Render", &sig)
        .build()?;

    let report = rewriter.rewrite(&mut subject)?;
    assert_eq!(report.member_sites_redirected, 1);
    assert_eq!(subject.primary_unit()?.member_refs[0].name, "Draw");
    assert!(rendered(&report.log)
        .contains(&"redirecting Host.Api.Widget.Render to Host.Api.Widget.Draw".to_string()));

    Ok(())
}

#[test]
fn gated_mapping_fires_across_an_instance_to_static_break() -> Result<()> {
    let instance = signatures::method(true, TypeCode::Void, &[TypeCode::R8])?;
    let stat = signatures::method(false, TypeCode::Void, &[TypeCode::R8])?;

    // Scale survived by name but became static, so the instance-shaped
    // original no longer resolves.
    let target = ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .member_def(1, "Scale", MemberFlags::PUBLIC | MemberFlags::STATIC, &stat)
        .build()?;

    let facades = FacadeMap::builder()
        .redirect_if_unresolved(
            MemberKey::new("Host.Api.Widget", "Scale", instance.clone()),
            MemberKey::new("Host.Api.Widget", "Scale", stat.clone()),
        )
        .finish();

    let rewriter = Rewriter::new(
        RewriterConfig::new()
            .with_target_image(target)
            .with_strip_name("Legacy.Platform")
            .with_facades(facades),
    )?;

    let mut subject = ModuleBuilder::new("Plugin")
        .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
        .type_ref(1, "Host.Api", "Widget")
        .member_ref(1, "Scale", &instance)
        .build()?;

    let report = rewriter.rewrite(&mut subject)?;
    assert_eq!(report.member_sites_redirected, 1);

    let site = &subject.primary_unit()?.member_refs[0];
    assert_eq!(site.name, "Scale");
    assert_eq!(site.signature, stat);
    assert!(!signatures::is_instance(&site.signature));

    Ok(())
}

#[test]
fn redirect_imports_a_type_ref_for_the_replacement_type() -> Result<()> {
    let sig = signatures::method(true, TypeCode::Void, &[])?;

    let target = ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .type_def("Host.Api", "Toolkit", TypeFlags::PUBLIC)
        .member_def(2, "Render", MemberFlags::PUBLIC, &sig)
        .build()?;

    let facades = FacadeMap::builder()
        .redirect(
            MemberKey::new("Host.Api.Widget", "Render", sig.clone()),
            MemberKey::new("Host.Api.Toolkit", "Render", sig.clone()),
        )
        .finish();

    let rewriter = Rewriter::new(
        RewriterConfig::new()
            .with_target_image(target)
            .with_strip_name("Legacy.Platform")
            .with_facades(facades),
    )?;

    // The subject never referenced Toolkit.
    let mut subject = ModuleBuilder::new("Plugin")
        .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
        .type_ref(1, "Host.Api", "Widget")
        .member_ref(1, "Render", &sig)
        .build()?;

    let report = rewriter.rewrite(&mut subject)?;
    assert_eq!(report.member_sites_redirected, 1);

    let unit = subject.primary_unit()?;
    assert_eq!(unit.type_refs.len(), 2, "a reference for Toolkit was imported");

    let imported = &unit.type_refs[1];
    assert_eq!(imported.namespace, "Host.Api");
    assert_eq!(imported.name, "Toolkit");
    assert_eq!(imported.scope, 1, "import points at the transplanted target reference");

    assert_eq!(unit.member_refs[0].class, 2);
    assert!(rendered(&report.log)
        .contains(&"redirecting Host.Api.Widget.Render to Host.Api.Toolkit.Render".to_string()));

    Ok(())
}

#[test]
fn duplicate_member_sites_all_redirected_one_notice() -> Result<()> {
    let sig = signatures::method(true, TypeCode::Void, &[])?;

    let target = ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .member_def(1, "Draw", MemberFlags::PUBLIC, &sig)
        .build()?;

    let facades = FacadeMap::builder()
        .redirect(
            MemberKey::new("Host.Api.Widget", "Render", sig.clone()),
            MemberKey::new("Host.Api.Widget", "Draw", sig.clone()),
        )
        .finish();

    let rewriter = Rewriter::new(
        RewriterConfig::new()
            .with_target_image(target)
            .with_strip_name("Legacy.Platform")
            .with_facades(facades),
    )?;

    let mut subject = ModuleBuilder::new("Plugin")
        .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
        .type_ref(1, "Host.Api", "Widget")
        .member_ref(1, "Render", &sig)
        .member_ref(1, "Render", &sig)
        .member_ref(1, "Render", &sig)
        .build()?;

    let report = rewriter.rewrite(&mut subject)?;
    assert_eq!(report.member_sites_redirected, 3);

    let unit = subject.primary_unit()?;
    for site in &unit.member_refs {
        assert_eq!(site.name, "Draw");
    }

    let mentions = rendered(&report.log)
        .iter()
        .filter(|n| n.contains("Render"))
        .count();
    assert_eq!(mentions, 1);

    Ok(())
}

#[test]
fn member_pass_only_runs_after_a_reference_strip() -> Result<()> {
    let sig = signatures::method(true, TypeCode::Void, &[])?;

    let target = ModuleBuilder::new("Platform.Core")
        .version(2, 0, 0)
        .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
        .member_def(1, "Draw", MemberFlags::PUBLIC, &sig)
        .build()?;

    let facades = FacadeMap::builder()
        .redirect(
            MemberKey::new("Host.Api.Widget", "Render", sig.clone()),
            MemberKey::new("Host.Api.Widget", "Draw", sig.clone()),
        )
        .finish();

    let rewriter = Rewriter::new(
        RewriterConfig::new()
            .with_target_image(target)
            .with_strip_name("Legacy.Platform")
            .with_facades(facades),
    )?;

    // Nothing to strip, so the whole rewrite is a no-op and the facade
    // table never gets consulted.
    let mut subject = ModuleBuilder::new("Plugin")
        .module_ref("Third.Party", ModuleVersion::new(0, 9, 0))
        .type_ref(1, "Host.Api", "Widget")
        .member_ref(1, "Render", &sig)
        .build()?;

    let before = subject.to_bytes()?;
    let report = rewriter.rewrite(&mut subject)?;

    assert!(!report.changed());
    assert_eq!(subject.primary_unit()?.member_refs[0].name, "Render");
    assert_eq!(subject.to_bytes()?, before);

    Ok(())
}
