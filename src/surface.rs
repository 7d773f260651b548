use super::*;

pub(crate) const SURFACE_ID: &str = "fallback-overlay";

// The surface covers the viewport but starts inert so an empty overlay
// never swallows clicks meant for the host page.
const SURFACE_STYLE_INERT: &str =
    "position:fixed;top:0;left:0;width:100%;height:100%;pointer-events:none;z-index:1000";
const SURFACE_STYLE_ACTIVE: &str =
    "position:fixed;top:0;left:0;width:100%;height:100%;pointer-events:auto;z-index:1000";

/// Returns the page's single overlay surface, creating it under `body` if
/// needed. Idempotent: an existing connected surface is reused as-is. A
/// handle whose node the host has since detached is dropped and replaced.
/// Returns `None` while the body is absent; the bootstrap retries later.
pub(crate) fn ensure_surface(
    engine: &mut FallbackEngine,
    page: &mut HostPage,
) -> Result<Option<NodeId>> {
    let Some(body) = page.body else {
        return Ok(None);
    };

    if let Some(existing) = engine.surface {
        if page.dom.is_connected(existing) {
            return Ok(Some(existing));
        }
        engine.surface = None;
        engine.bindings.clear();
        page.trace_render_line("[surface] stale handle dropped".into());
    }

    if let Some(existing) = page.dom.by_id(SURFACE_ID) {
        engine.surface = Some(existing);
        return Ok(Some(existing));
    }

    let surface = page.dom.create_element(
        body,
        "div",
        &[("id", SURFACE_ID), ("style", SURFACE_STYLE_INERT)],
    );
    engine.surface = Some(surface);
    page.trace_render_line("[surface] created".into());
    Ok(Some(surface))
}

/// Empties the surface without destroying it. Interaction bindings belong
/// exclusively to surface content, so they are dropped here as well.
pub(crate) fn clear_surface(engine: &mut FallbackEngine, page: &mut HostPage, surface: NodeId) {
    page.dom.remove_children(surface);
    engine.bindings.clear();
}

pub(crate) fn show_surface(page: &mut HostPage, surface: NodeId) -> Result<()> {
    page.dom.set_attr(surface, "style", SURFACE_STYLE_ACTIVE)
}

/// Empties the surface and returns it to the inert state; used when the
/// host engine has painted its own interactive tree.
pub(crate) fn retract_surface(
    engine: &mut FallbackEngine,
    page: &mut HostPage,
    surface: NodeId,
) -> Result<()> {
    clear_surface(engine, page, surface);
    page.dom.set_attr(surface, "style", SURFACE_STYLE_INERT)?;
    page.trace_render_line("[surface] retracted, host content present".into());
    Ok(())
}
