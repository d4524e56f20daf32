//! Command dispatcher
//!
//! Each handler is a sequence of fallible steps against the host. Steps that
//! already ran are not undone when a later one fails.

use std::time::Instant;

use docbridge_core_types::RequestContext;

use crate::commands::{Command, FrameSpec, PageSelector, TextSpec};
use crate::envelope::{CommandOutput, EntityDescriptor, Request, Response, StatusReport};
use crate::errors::{BridgeError, Result};
use crate::host::DocumentHost;
use crate::model::{
    Capability, EntityId, EntityKind, FontName, LayoutMode, Paint, PaddingQuad, Property,
    SizingMode,
};
use crate::{log_op_end, log_op_error, log_op_start};

/// Handle one request envelope, producing exactly one response
pub async fn handle_request<H>(host: &mut H, request: Request) -> Response
where
    H: DocumentHost + ?Sized,
{
    let ctx = RequestContext::with_request_id(request.id.clone(), request.command.clone());
    let start = Instant::now();
    log_op_start!(ctx.command.as_str(), request_id = ctx.request_id.as_str());

    let result = match Command::parse(&request.command, &request.args) {
        Ok(command) => dispatch(host, &command).await,
        Err(err) => Err(err),
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(
                ctx.command.as_str(),
                duration_ms = duration_ms,
                request_id = ctx.request_id.as_str()
            );
        }
        Err(err) => {
            log_op_error!(
                ctx.command.as_str(),
                err,
                duration_ms = duration_ms,
                request_id = ctx.request_id.as_str()
            );
        }
    }

    Response::from_result(request.id, result)
}

/// Run a decoded command against the host
///
/// # Errors
///
/// Returns the handler's failure; see [`BridgeError`] for the vocabulary.
pub async fn dispatch<H>(host: &mut H, command: &Command) -> Result<CommandOutput>
where
    H: DocumentHost + ?Sized,
{
    tracing::trace!(command = command.name(), "dispatching");
    match command {
        Command::Status => Ok(CommandOutput::Status(status(host)?)),
        Command::CreatePage { name } => create_page(host, name),
        Command::SetCurrentPage { id_or_name } => set_current_page(host, id_or_name.as_ref()),
        Command::CreateFrame(spec) => create_frame(host, spec).await,
        Command::CreateText(spec) => create_text(host, spec).await,
        Command::SetText { id, text } => set_text(host, id.as_deref(), text.as_deref()).await,
        Command::SetFill { id, color } => {
            let id = resolve(host, id.as_deref())
                .await
                .ok_or_else(|| BridgeError::EntityNotFound { id: id.clone() })?;
            if let Some(color) = color {
                apply_if_capable(host, &id, Property::Fills(vec![Paint::solid(*color)]))?;
            }
            describe(host, &id)
        }
        Command::SetOpacity { id, value } => {
            let id = resolve(host, id.as_deref())
                .await
                .filter(|id| capable(&*host, id, Capability::Opacity))
                .ok_or_else(|| BridgeError::OpacityEntityNotFound { id: id.clone() })?;
            let value = value.ok_or_else(|| BridgeError::missing("opacity value"))?;
            host.apply(&id, Property::Opacity(value))?;
            describe(host, &id)
        }
        Command::SetLayout {
            id,
            mode,
            gap,
            padding,
        } => {
            let id = resolve(host, id.as_deref())
                .await
                .filter(|id| capable(&*host, id, Capability::AutoLayout))
                .ok_or_else(|| BridgeError::LayoutEntityNotFound { id: id.clone() })?;
            if let Some(mode) = mode {
                host.apply(&id, Property::LayoutMode(*mode))?;
            }
            if let Some(gap) = gap {
                host.apply(&id, Property::ItemSpacing(*gap))?;
            }
            if let Some(padding) = padding {
                host.apply(&id, Property::Padding(*padding))?;
            }
            describe(host, &id)
        }
    }
}

fn status<H: DocumentHost + ?Sized>(host: &H) -> Result<StatusReport> {
    let page_id = host.current_page_id();
    let page = host
        .entity(&page_id)
        .ok_or_else(|| BridgeError::Internal {
            message: format!("current page {} is missing", page_id),
        })?;
    Ok(StatusReport {
        file_name: host.document_name(),
        file_key: host.document_key().unwrap_or_default(),
        page_id: page.id.clone(),
        page_name: page.name.clone(),
    })
}

fn create_page<H: DocumentHost + ?Sized>(host: &mut H, name: &str) -> Result<CommandOutput> {
    let id = host.create_entity(EntityKind::Page)?;
    host.apply(&id, Property::Name(name.to_string()))?;
    describe(host, &id)
}

fn set_current_page<H: DocumentHost + ?Sized>(
    host: &mut H,
    selector: Option<&PageSelector>,
) -> Result<CommandOutput> {
    let selector = selector.ok_or_else(|| BridgeError::missing("idOrName"))?;
    let page_id = host
        .root_children()
        .into_iter()
        .find(|child| {
            host.entity(child)
                .is_some_and(|page| selector.matches(&page.id) || selector.matches(&page.name))
        })
        .ok_or_else(|| BridgeError::PageNotFound {
            id_or_name: selector.as_str().to_string(),
        })?;
    host.set_current_page(&page_id)?;
    describe(host, &page_id)
}

async fn create_frame<H: DocumentHost + ?Sized>(
    host: &mut H,
    spec: &FrameSpec,
) -> Result<CommandOutput> {
    let id = host.create_entity(EntityKind::Frame)?;
    host.apply(&id, Property::Name(spec.name.clone()))?;
    host.apply(
        &id,
        Property::Position {
            x: spec.x,
            y: spec.y,
        },
    )?;
    host.apply(
        &id,
        Property::Size {
            width: spec.width,
            height: spec.height,
        },
    )?;

    if let Some(fill) = spec.fill {
        apply_if_capable(host, &id, Property::Fills(vec![Paint::solid(fill)]))?;
    }
    if let Some(stroke) = spec.stroke {
        apply_if_capable(host, &id, Property::Strokes(vec![Paint::solid(stroke)]))?;
    }
    if let Some(weight) = spec.stroke_weight {
        apply_if_capable(host, &id, Property::StrokeWeight(weight))?;
    }
    if let Some(radius) = spec.radius {
        apply_if_capable(host, &id, Property::CornerRadius(radius))?;
    }
    if let Some(opacity) = spec.opacity {
        apply_if_capable(host, &id, Property::Opacity(opacity))?;
    }
    if let Some(layout) = &spec.layout {
        apply_layout(host, &id, layout.mode, layout.item_spacing, layout.padding)?;
    }

    append_to_parent(host, &id, spec.parent_id.as_deref()).await?;
    describe(host, &id)
}

async fn create_text<H: DocumentHost + ?Sized>(
    host: &mut H,
    spec: &TextSpec,
) -> Result<CommandOutput> {
    let id = host.create_entity(EntityKind::Text)?;
    host.load_font(&spec.font).await?;

    // The entity may have been removed while the font loaded
    ensure_exists(host, &id)?;
    host.apply(&id, Property::FontName(spec.font.clone()))?;
    host.apply(&id, Property::Characters(spec.text.clone()))?;
    host.apply(&id, Property::Name(spec.name.clone()))?;
    host.apply(
        &id,
        Property::Position {
            x: spec.x,
            y: spec.y,
        },
    )?;

    if let Some(size) = spec.font_size {
        apply_if_capable(host, &id, Property::FontSize(size))?;
    }
    if let Some(fill) = spec.fill {
        apply_if_capable(host, &id, Property::Fills(vec![Paint::solid(fill)]))?;
    }
    if let Some(opacity) = spec.opacity {
        apply_if_capable(host, &id, Property::Opacity(opacity))?;
    }

    append_to_parent(host, &id, spec.parent_id.as_deref()).await?;
    describe(host, &id)
}

async fn set_text<H: DocumentHost + ?Sized>(
    host: &mut H,
    id: Option<&str>,
    text: Option<&str>,
) -> Result<CommandOutput> {
    let not_found = || BridgeError::TextEntityNotFound {
        id: id.map(str::to_string),
    };
    let entity_id = resolve(host, id)
        .await
        .filter(|found| is_kind(&*host, found, EntityKind::Text))
        .ok_or_else(not_found)?;
    let text = text.ok_or_else(|| BridgeError::missing("text"))?;

    let font = host
        .entity(&entity_id)
        .and_then(|entity| entity.font_name().cloned())
        .unwrap_or_else(FontName::default);
    host.load_font(&font).await?;

    if !is_kind(host, &entity_id, EntityKind::Text) {
        return Err(not_found());
    }
    host.apply(&entity_id, Property::Characters(text.to_string()))?;
    describe(host, &entity_id)
}

/// Enable auto layout; both axes switch to content-driven sizing
fn apply_layout<H: DocumentHost + ?Sized>(
    host: &mut H,
    id: &str,
    mode: LayoutMode,
    item_spacing: Option<f64>,
    padding: Option<PaddingQuad>,
) -> Result<()> {
    if !capable(host, id, Capability::AutoLayout) {
        tracing::debug!(entity_id = id, "layout not supported, skipping");
        return Ok(());
    }
    host.apply(id, Property::LayoutMode(mode))?;
    host.apply(id, Property::PrimaryAxisSizing(SizingMode::Auto))?;
    host.apply(id, Property::CounterAxisSizing(SizingMode::Auto))?;
    if let Some(spacing) = item_spacing {
        host.apply(id, Property::ItemSpacing(spacing))?;
    }
    if let Some(padding) = padding {
        host.apply(id, Property::Padding(padding))?;
    }
    Ok(())
}

/// Move `id` under `parent_id` when it resolves to a container, else under
/// the current page
async fn append_to_parent<H: DocumentHost + ?Sized>(
    host: &mut H,
    id: &str,
    parent_id: Option<&str>,
) -> Result<()> {
    if let Some(parent) = resolve(host, parent_id).await {
        if capable(host, &parent, Capability::Children) {
            return host.append_child(&parent, id);
        }
        tracing::debug!(entity_id = id, parent_id = %parent, "parent cannot hold children, using current page");
    }
    let page = host.current_page_id();
    host.append_child(&page, id)
}

async fn resolve<H: DocumentHost + ?Sized>(host: &H, id: Option<&str>) -> Option<EntityId> {
    match id {
        Some(id) => host.lookup(id).await,
        None => None,
    }
}

fn apply_if_capable<H: DocumentHost + ?Sized>(
    host: &mut H,
    id: &str,
    property: Property,
) -> Result<()> {
    match property.capability() {
        Some(capability) if !capable(host, id, capability) => {
            tracing::debug!(
                entity_id = id,
                capability = capability.property_name(),
                "capability absent, skipping"
            );
            Ok(())
        }
        _ => host.apply(id, property),
    }
}

fn capable<H: DocumentHost + ?Sized>(host: &H, id: &str, capability: Capability) -> bool {
    host.entity(id)
        .is_some_and(|entity| entity.has_capability(capability))
}

fn is_kind<H: DocumentHost + ?Sized>(host: &H, id: &str, kind: EntityKind) -> bool {
    host.entity(id).is_some_and(|entity| entity.kind() == kind)
}

fn ensure_exists<H: DocumentHost + ?Sized>(host: &H, id: &str) -> Result<()> {
    host.entity(id).map(|_| ()).ok_or(BridgeError::EntityNotFound {
        id: Some(id.to_string()),
    })
}

fn describe<H: DocumentHost + ?Sized>(host: &H, id: &str) -> Result<CommandOutput> {
    host.entity(id)
        .map(|entity| CommandOutput::Entity(EntityDescriptor::from(entity)))
        .ok_or(BridgeError::EntityNotFound {
            id: Some(id.to_string()),
        })
}
