//! Element commands
//!
//! Translates abstract element operations into either `au.getElement(...)`
//! command strings for the native bridge or atom executions for web content.
//! The context is fixed per session, so dispatch happens on a variant chosen
//! once rather than a boolean re-checked per call.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use serde_json::{json, Value};

use crate::client::{AtomExecutor, SessionContext, UiAutoClient};
use crate::content_size::{
    compute_content_size, ContainerKind, ContentSize, Dimensions, Frame, Point,
};
use crate::error::DriverError;
use crate::utils::{deescape_newlines, escape_special_chars};

/// Attributes a UIAElement actually exposes; everything else is rejected
const NATIVE_ATTRIBUTES: [&str; 6] = ["label", "name", "value", "values", "hint", "contentSize"];

/// Options affecting native value injection
#[derive(Debug, Clone, Default)]
pub struct ElementOptions {
    /// Drive the keyboard through the robot instead of UIAutomation
    pub use_robot: bool,
}

/// Element operations for one automation session
pub struct ElementCommands<C, A> {
    client: Arc<C>,
    atoms: Arc<A>,
    context: SessionContext,
    opts: ElementOptions,
}

impl<C, A> ElementCommands<C, A>
where
    C: UiAutoClient,
    A: AtomExecutor,
{
    pub fn new(client: Arc<C>, atoms: Arc<A>, context: SessionContext) -> Self {
        Self {
            client,
            atoms,
            context,
            opts: ElementOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: ElementOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Wrap an element id the way atoms expect it.
    fn atoms_element(el: &str) -> Value {
        json!({ "ELEMENT": el })
    }

    pub async fn get_attribute(&self, attribute: &str, el: &str) -> Result<Value> {
        if self.context.is_web() {
            return self
                .atoms
                .execute_atom(
                    "get_attribute_value",
                    vec![Self::atoms_element(el), json!(attribute)],
                )
                .await;
        }

        if !NATIVE_ATTRIBUTES.contains(&attribute) {
            return Err(DriverError::UnknownAttribute(attribute.to_string()).into());
        }
        if attribute == "contentSize" {
            let content_size = self.get_element_content_size(el).await?;
            return serde_json::to_value(content_size).context("failed to encode content size");
        }
        self.client
            .send_command(&format!("au.getElement('{el}').{attribute}()"))
            .await
    }

    pub async fn clear(&self, el: &str) -> Result<()> {
        if self.context.is_web() {
            self.atoms
                .execute_atom("clear", vec![Self::atoms_element(el)])
                .await?;
        } else {
            self.client
                .send_command(&format!("au.getElement('{el}').setValue('')"))
                .await?;
        }
        Ok(())
    }

    pub async fn set_value_immediate(&self, value: &str, el: &str) -> Result<()> {
        let value = escape_special_chars(value);
        self.client
            .send_command(&format!("au.getElement('{el}').setValue('{value}')"))
            .await?;
        Ok(())
    }

    pub async fn set_value(&self, value: &str, el: &str) -> Result<()> {
        if self.context.is_web() {
            let element = Self::atoms_element(el);
            self.atoms
                .execute_atom("click", vec![element.clone()])
                .await?;
            self.atoms
                .execute_atom("type", vec![element, json!(value)])
                .await?;
            return Ok(());
        }

        if self.opts.use_robot {
            return Err(DriverError::NotImplemented("setValue via robot").into());
        }
        let value = deescape_newlines(&escape_special_chars(value));
        self.client
            .send_command(&format!("au.getElement('{el}').setValueByType('{value}')"))
            .await?;
        Ok(())
    }

    pub async fn get_text(&self, el: &str) -> Result<String> {
        if self.context.is_web() {
            let value = self
                .atoms
                .execute_atom("get_text", vec![Self::atoms_element(el)])
                .await?;
            return Ok(value.as_str().unwrap_or_default().to_string());
        }

        let value = self
            .client
            .send_command(&format!("au.getElement('{el}').text()"))
            .await?;
        // Instruments occasionally reports text as a number; callers always
        // get a string.
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub async fn element_displayed(&self, el: &str) -> Result<bool> {
        if self.context.is_web() {
            let value = self
                .atoms
                .execute_atom("is_displayed", vec![Self::atoms_element(el)])
                .await?;
            return Ok(value_to_bool(&value));
        }
        let value = self
            .client
            .send_command(&format!("au.getElement('{el}').isDisplayed()"))
            .await?;
        Ok(value_to_bool(&value))
    }

    pub async fn element_enabled(&self, el: &str) -> Result<bool> {
        if self.context.is_web() {
            let value = self
                .atoms
                .execute_atom("is_enabled", vec![Self::atoms_element(el)])
                .await?;
            return Ok(value_to_bool(&value));
        }
        // isEnabled() reports 1/0, so the comparison happens bridge-side
        let value = self
            .client
            .send_command(&format!("au.getElement('{el}').isEnabled() === 1"))
            .await?;
        Ok(value_to_bool(&value))
    }

    pub async fn element_selected(&self, el: &str) -> Result<bool> {
        if self.context.is_web() {
            let value = self
                .atoms
                .execute_atom("is_selected", vec![Self::atoms_element(el)])
                .await?;
            return Ok(value_to_bool(&value));
        }
        let value = self
            .client
            .send_command(&format!("au.getElement('{el}').isSelected()"))
            .await?;
        Ok(value_to_bool(&value))
    }

    /// Element class name (`UIATableView`, ...) on native; lowercased tag
    /// name on web.
    pub async fn get_name(&self, el: &str) -> Result<String> {
        if self.context.is_web() {
            let script = "return arguments[0].tagName.toLowerCase()";
            let value = self
                .atoms
                .execute_atom(
                    "execute_script",
                    vec![json!(script), json!([Self::atoms_element(el)])],
                )
                .await?;
            return Ok(value.as_str().unwrap_or_default().to_string());
        }
        let value = self
            .client
            .send_command(&format!("au.getElement('{el}').type()"))
            .await?;
        value
            .as_str()
            .map(ToOwned::to_owned)
            .with_context(|| format!("unexpected element type reply: {value}"))
    }

    pub async fn get_location(&self, el: &str) -> Result<Point> {
        let value = if self.context.is_web() {
            self.atoms
                .execute_atom("get_top_left_coordinates", vec![Self::atoms_element(el)])
                .await?
        } else {
            self.client
                .send_command(&format!("au.getElement('{el}').getElementLocation()"))
                .await?
        };
        serde_json::from_value(value).context("failed to decode element location")
    }

    pub async fn get_location_in_view(&self, el: &str) -> Result<Point> {
        self.get_location(el).await
    }

    pub async fn get_size(&self, el: &str) -> Result<Dimensions> {
        let value = if self.context.is_web() {
            self.atoms
                .execute_atom("get_size", vec![Self::atoms_element(el)])
                .await?
        } else {
            self.client
                .send_command(&format!("au.getElement('{el}').getElementSize()"))
                .await?
        };
        serde_json::from_value(value).context("failed to decode element size")
    }

    /// Query handed to the element-finding subsystem to locate a container's
    /// first visible child, paired with the `-ios uiautomation` strategy.
    pub fn first_visible_child_query(&self) -> &'static str {
        ".elements().withPredicate(\"isVisible == 1\");"
    }

    /// Content size of a scrollable container.
    ///
    /// `None` when the element's class has no content-size semantics; the
    /// size and location round trips are skipped in that case.
    pub async fn get_element_content_size(&self, el: &str) -> Result<Option<ContentSize>> {
        let value = self
            .client
            .send_command(&format!("au.getElement('{el}').childElementsFrames()"))
            .await?;
        let frames: Vec<Frame> =
            serde_json::from_value(value).context("failed to decode child frames")?;

        let kind = ContainerKind::from_class_name(&self.get_name(el).await?);
        if kind == ContainerKind::Unsupported {
            debug!("content size is only defined for table and collection views");
            return Ok(None);
        }

        let size = self.get_size(el).await?;
        let origin = self.get_location_in_view(el).await?;
        Ok(compute_content_size(kind, &frames, size, origin))
    }
}

/// Bridge replies use booleans and 0/1 interchangeably.
fn value_to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        _ => false,
    }
}
