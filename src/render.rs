//! Page rendering over a directory of handlebars templates. Handlers
//! produce a JSON context; templates are a presentation collaborator and
//! depend only on that context.

use std::sync::Arc;

use axum::response::Html;
use handlebars::Handlebars;
use serde_json::{Map, Value};

use crate::error::AppResult;
use crate::flash::Flash;
use crate::web::middleware::CurrentUser;

#[derive(Clone)]
pub struct Pages {
    registry: Arc<Handlebars<'static>>,
}

impl Pages {
    pub fn new(template_dir: &str) -> Result<Self, handlebars::TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_templates_directory(".hbs", template_dir)?;
        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    pub fn render(
        &self,
        template: &str,
        user: Option<&CurrentUser>,
        flash: Option<Flash>,
        context: Value,
    ) -> AppResult<Html<String>> {
        let context = with_base(user, flash, context);
        let body = self.registry.render(template, &context)?;
        Ok(Html(body))
    }
}

/// Every page gets `current_user` and `flash` alongside its own context.
fn with_base(user: Option<&CurrentUser>, flash: Option<Flash>, context: Value) -> Value {
    let mut map = match context {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert(
        "current_user".to_string(),
        match user {
            Some(u) => serde_json::json!({
                "id": u.id,
                "username": u.username,
                "is_staff": u.is_staff,
            }),
            None => Value::Null,
        },
    );
    map.insert(
        "flash".to_string(),
        flash.map(|f| serde_json::to_value(f).unwrap_or(Value::Null)).unwrap_or(Value::Null),
    );
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::Level;

    #[test]
    fn base_context_is_merged() {
        let user = CurrentUser {
            id: 7,
            username: "ann".to_string(),
            is_staff: false,
        };
        let flash = Flash {
            level: Level::Success,
            message: "done".to_string(),
        };
        let ctx = with_base(Some(&user), Some(flash), serde_json::json!({"total": 3}));
        assert_eq!(ctx["total"], 3);
        assert_eq!(ctx["current_user"]["username"], "ann");
        assert_eq!(ctx["flash"]["message"], "done");
        assert_eq!(ctx["flash"]["level"], "success");
    }

    #[test]
    fn anonymous_context_has_null_user() {
        let ctx = with_base(None, None, Value::Null);
        assert_eq!(ctx["current_user"], Value::Null);
        assert_eq!(ctx["flash"], Value::Null);
    }
}
