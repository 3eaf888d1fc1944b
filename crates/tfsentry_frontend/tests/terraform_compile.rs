//! Integration tests for Terraform compilation through the dispatcher.

use std::fs;

use tempfile::tempdir;
use tfsentry_frontend::{FrontendRegistry, Language};
use tfsentry_ir::{PropertyValue, ResolvedValue, Scalar};

#[test]
fn test_multi_file_compile_follows_discovery_order() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("b_storage.tf"),
        r#"
        resource "aws_s3_bucket" "logs" {
          bucket = "audit-logs"
        }
        "#,
    )
    .unwrap();
    fs::write(
        dir.path().join("a_network.tf"),
        r#"
        resource "aws_vpc" "main" {
          cidr_block = "10.0.0.0/16"
        }
        "#,
    )
    .unwrap();

    let registry = FrontendRegistry::with_defaults();
    let graph = registry.compile(Language::Terraform, dir.path()).unwrap();

    // a_network.tf sorts before b_storage.tf, so the VPC comes first.
    let types: Vec<_> = graph.resources().map(|r| r.r#type.as_str()).collect();
    assert_eq!(types, vec!["aws_vpc", "aws_s3_bucket"]);

    // Identical inputs compile to the same shape on a second run.
    let again = registry.compile(Language::Terraform, dir.path()).unwrap();
    let again_types: Vec<_> = again.resources().map(|r| r.r#type.as_str()).collect();
    assert_eq!(types, again_types);
}

#[test]
fn test_cross_file_reference_resolves() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("instance.tf"),
        r#"
        resource "aws_instance" "web" {
          subnet_id = aws_subnet.main.cidr
        }
        "#,
    )
    .unwrap();
    fs::write(
        dir.path().join("network.tf"),
        r#"
        resource "aws_subnet" "main" {
          cidr = "10.0.1.0/24"
        }
        "#,
    )
    .unwrap();

    let registry = FrontendRegistry::with_defaults();
    let graph = registry.compile(Language::Terraform, dir.path()).unwrap();

    assert!(graph.unresolved().is_empty());
    let web = graph.resources().find(|r| r.name == "web").unwrap();
    let Some(PropertyValue::Ref(reference)) = web.properties.get("subnet_id") else {
        panic!("expected reference property");
    };
    assert_eq!(
        graph.chase(*reference),
        Some(ResolvedValue::Scalar(&Scalar::from("10.0.1.0/24")))
    );
}

#[test]
fn test_single_file_root_compiles() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("main.tf");
    fs::write(
        &file,
        r#"
        resource "aws_kms_key" "signing" {
          enable_key_rotation = true
        }
        "#,
    )
    .unwrap();

    let registry = FrontendRegistry::with_defaults();
    let graph = registry.compile(Language::Terraform, &file).unwrap();
    assert_eq!(graph.resources().count(), 1);
}
