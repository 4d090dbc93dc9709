use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::database::Entity;
use crate::utils::error::{AppError, AppResult};
use crate::utils::multipart::MultipartForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Home,
    Navbar,
    Sidebar,
}

impl FromStr for ComponentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(ComponentType::Home),
            "navbar" => Ok(ComponentType::Navbar),
            "sidebar" => Ok(ComponentType::Sidebar),
            _ => Err(AppError::BadRequest("Invalid UI component type".to_string())),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComponentType::Home => "home",
            ComponentType::Navbar => "navbar",
            ComponentType::Sidebar => "sidebar",
        })
    }
}

/// Configurable entry of the home screen, navbar or sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UiComponent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub order: i64,
}

impl Entity for UiComponent {
    const COLLECTION: &'static str = "uicomponents";
    const LABEL: &'static str = "UI component";

    fn id(&self) -> &str {
        &self.id
    }
}

fn parse_order(raw: Option<String>) -> AppResult<Option<i64>> {
    raw.map(|r| {
        r.parse::<i64>()
            .map_err(|_| AppError::BadRequest("order must be an integer".to_string()))
    })
    .transpose()
}

impl UiComponent {
    /// Builds a component from multipart text fields. The icon upload is attached by the caller.
    pub fn from_form(form: &MultipartForm) -> AppResult<Self> {
        let component_type = form.text("type").unwrap_or_default().parse::<ComponentType>()?;
        let name = form
            .text("name")
            .ok_or_else(|| AppError::BadRequest("Name is required".to_string()))?;

        Ok(Self {
            id: ObjectId::new().to_hex(),
            component_type,
            name,
            icon: None,
            description: form.text("description"),
            tag: form.text("tag"),
            order: parse_order(form.text("order"))?.unwrap_or(0),
        })
    }

    /// Applies the non-empty fields of a multipart update.
    pub fn apply_form(&mut self, form: &MultipartForm) -> AppResult<()> {
        if let Some(raw) = form.text("type") {
            self.component_type = raw.parse()?;
        }
        if let Some(name) = form.text("name") {
            self.name = name;
        }
        if let Some(description) = form.text("description") {
            self.description = Some(description);
        }
        if let Some(tag) = form.text("tag") {
            self.tag = Some(tag);
        }
        if let Some(order) = parse_order(form.text("order"))? {
            self.order = order;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> MultipartForm {
        let mut f = MultipartForm::default();
        for (k, v) in pairs {
            f.fields.insert(k.to_string(), v.to_string());
        }
        f
    }

    #[test]
    fn builds_from_form_with_default_order() {
        let c = UiComponent::from_form(&form(&[("type", "sidebar"), ("name", "Notes")])).unwrap();
        assert_eq!(c.component_type, ComponentType::Sidebar);
        assert_eq!(c.order, 0);
    }

    #[test]
    fn rejects_unknown_type() {
        let err = UiComponent::from_form(&form(&[("type", "footer"), ("name", "x")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid UI component type");
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let mut c =
            UiComponent::from_form(&form(&[("type", "home"), ("name", "Books"), ("tag", "new"), ("order", "3")]))
                .unwrap();
        c.icon = Some("/uploads/icon.png".into());
        c.apply_form(&form(&[("name", "E-Books"), ("tag", "")])).unwrap();
        assert_eq!(c.name, "E-Books");
        assert_eq!(c.tag.as_deref(), Some("new"));
        assert_eq!(c.order, 3);
        assert_eq!(c.icon.as_deref(), Some("/uploads/icon.png"));
    }
}
