//! Terraform (HCL) front end.
//!
//! Maps HCL syntax onto the canonical graph: `resource` blocks become
//! resource nodes, `output` blocks become outputs, traversal expressions
//! (`aws_s3_bucket.logs.id`) become reference nodes. Expression forms
//! with no IR counterpart degrade to their rendered text instead of
//! failing the compile.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use hcl::{Body, Expression, ObjectKey, Traversal, TraversalOperator};
use tracing::debug;

use tfsentry_ir::{Attribute, Graph, GraphBuilder, OutputValue, PropertyValue, Scalar};

use crate::discover::WalkOptions;
use crate::error::{FrontendError, FrontendResult};
use crate::registry::{Frontend, Language};

/// Front end for Terraform configuration.
#[derive(Debug, Clone, Default)]
pub struct TerraformFrontend;

impl TerraformFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for TerraformFrontend {
    fn language(&self) -> Language {
        Language::Terraform
    }

    fn walk_options(&self) -> WalkOptions {
        WalkOptions::new(0, &[".tf", ".tfvars"])
    }

    fn compile(&self, sources: &[PathBuf]) -> FrontendResult<Graph> {
        let mut builder = GraphBuilder::new();
        for source in sources {
            let content = fs::read_to_string(source)?;
            let body = hcl::parse(&content).map_err(|e| FrontendError::ParseFailure {
                file: source.clone(),
                message: e.to_string(),
            })?;
            build_file(&mut builder, &body);
        }
        Ok(builder.finish())
    }
}

fn build_file(builder: &mut GraphBuilder, body: &Body) {
    for block in body.blocks() {
        match block.identifier.as_str() {
            "resource" => {
                let labels: Vec<&str> = block.labels.iter().map(|l| l.as_str()).collect();
                let [r#type, name] = labels.as_slice() else {
                    debug!("skipping resource block with {} labels", labels.len());
                    continue;
                };
                let properties = body_properties(builder, &block.body);
                builder.resource(*name, *r#type, properties);
            }
            "output" => {
                let Some(name) = block.labels.first().map(|l| l.as_str()) else {
                    debug!("skipping unlabeled output block");
                    continue;
                };
                let (r#type, value) = output_parts(builder, &block.body);
                builder.output(name, r#type, value);
            }
            other => {
                // provider, variable, terraform, data and friends carry
                // no resource semantics at this layer.
                debug!("skipping block: {other}");
            }
        }
    }
}

/// Collect a block body into a property map. Repeated nested blocks of
/// the same name collapse into a list, matching how the configuration
/// language treats them.
fn body_properties(builder: &mut GraphBuilder, body: &Body) -> BTreeMap<String, PropertyValue> {
    let mut properties = BTreeMap::new();
    for attr in body.attributes() {
        properties.insert(
            attr.key.as_str().to_string(),
            convert_expression(builder, &attr.expr),
        );
    }
    for block in body.blocks() {
        let value = PropertyValue::Map(body_properties(builder, &block.body));
        let key = block.identifier.as_str().to_string();
        match properties.get_mut(&key) {
            Some(PropertyValue::List(items)) => items.push(value),
            Some(existing) => {
                let first = existing.clone();
                *existing = PropertyValue::List(vec![first, value]);
            }
            None => {
                properties.insert(key, value);
            }
        }
    }
    properties
}

fn output_parts(builder: &mut GraphBuilder, body: &Body) -> (String, OutputValue) {
    let declared_type = body
        .attributes()
        .find(|a| a.key.as_str() == "type")
        .map(|a| render(&a.expr));

    let value = match body.attributes().find(|a| a.key.as_str() == "value") {
        Some(attr) => match convert_expression(builder, &attr.expr) {
            PropertyValue::Ref(id) => OutputValue::Ref(id),
            PropertyValue::Scalar(Scalar::String(s)) => OutputValue::Literal(s),
            other => OutputValue::Literal(
                serde_json::to_string(&other).unwrap_or_default(),
            ),
        },
        None => OutputValue::Literal(String::new()),
    };

    let r#type = declared_type.unwrap_or_else(|| match &value {
        OutputValue::Literal(_) => "string".to_string(),
        OutputValue::Ref(_) => "dynamic".to_string(),
    });
    (r#type, value)
}

fn convert_expression(builder: &mut GraphBuilder, expr: &Expression) -> PropertyValue {
    match expr {
        Expression::Bool(b) => PropertyValue::Scalar(Scalar::Bool(*b)),
        Expression::Number(n) => {
            PropertyValue::Scalar(Scalar::Number(n.as_f64().unwrap_or_default()))
        }
        Expression::String(s) => PropertyValue::Scalar(Scalar::String(s.clone())),
        Expression::Array(items) => PropertyValue::List(
            items
                .iter()
                .map(|item| convert_expression(builder, item))
                .collect(),
        ),
        Expression::Object(object) => PropertyValue::Map(
            object
                .iter()
                .map(|(key, value)| (object_key(key), convert_expression(builder, value)))
                .collect(),
        ),
        Expression::Variable(variable) => {
            PropertyValue::Ref(builder.reference(variable.as_str(), Vec::new()))
        }
        Expression::Traversal(traversal) => traversal_reference(builder, traversal)
            .unwrap_or_else(|| PropertyValue::Scalar(Scalar::String(render(expr)))),
        Expression::Parenthesis(inner) => convert_expression(builder, inner),
        // Templates, function calls, conditionals and the rest have no
        // canonical value until apply time; keep their source text.
        other => PropertyValue::Scalar(Scalar::String(render(other))),
    }
}

/// Turn a traversal like `aws_s3_bucket.logs.id` into a reference node:
/// target address `aws_s3_bucket.logs`, property path `["id"]`. Returns
/// `None` for splats and dynamic indices.
fn traversal_reference(builder: &mut GraphBuilder, traversal: &Traversal) -> Option<PropertyValue> {
    let Expression::Variable(root) = &traversal.expr else {
        return None;
    };
    let mut target = root.as_str().to_string();
    let mut operators = traversal.operators.as_slice();

    if let Some((TraversalOperator::GetAttr(attr), rest)) = operators.split_first() {
        target = format!("{target}.{}", attr.as_str());
        operators = rest;
    }

    let mut property = Vec::with_capacity(operators.len());
    for operator in operators {
        match operator {
            TraversalOperator::GetAttr(attr) => {
                property.push(Attribute::Key(attr.as_str().to_string()));
            }
            TraversalOperator::Index(Expression::Number(n)) => {
                property.push(Attribute::Index(n.as_f64().unwrap_or_default() as usize));
            }
            TraversalOperator::LegacyIndex(i) => {
                property.push(Attribute::Index(*i as usize));
            }
            _ => return None,
        }
    }
    Some(PropertyValue::Ref(builder.reference(target, property)))
}

fn object_key(key: &ObjectKey) -> String {
    match key {
        ObjectKey::Identifier(id) => id.as_str().to_string(),
        other => hcl::format::to_string(other).unwrap_or_default(),
    }
}

fn render(expr: &Expression) -> String {
    hcl::format::to_string(expr).unwrap_or_default()
}
