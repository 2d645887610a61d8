// ==========================================
// 内容管理系统 - 内置集合定义
// ==========================================
// 职责: 博客文章 / 商品 两个内置集合 + 集合注册表
// ==========================================

use crate::domain::collection::{CollectionSchema, FieldDeclaration, FieldKind, RowRule, RuleCheck};

const STATUS_OPTIONS: [(&str, &str); 4] = [
    ("Draft", "draft"),
    ("Review", "review"),
    ("Published", "published"),
    ("Archived", "archived"),
];

const STATUS_SYNONYMS: [(&str, &str); 10] = [
    ("wip", "draft"),
    ("unpublished", "draft"),
    ("pending", "review"),
    ("in review", "review"),
    ("needs review", "review"),
    ("live", "published"),
    ("public", "published"),
    ("active", "published"),
    ("retired", "archived"),
    ("inactive", "archived"),
];

/// 博客文章集合
pub fn posts() -> CollectionSchema {
    CollectionSchema::new(
        "posts",
        vec![
            FieldDeclaration::new("title", FieldKind::Text)
                .required()
                .localized()
                .aliases(&["headline", "post title"]),
            FieldDeclaration::new("slug", FieldKind::Text).aliases(&["permalink"]),
            FieldDeclaration::new("excerpt", FieldKind::Textarea)
                .localized()
                .aliases(&["summary"]),
            FieldDeclaration::new("body", FieldKind::RichText)
                .required()
                .localized()
                .aliases(&["content"]),
            FieldDeclaration::new("category", FieldKind::Select)
                .options(&[
                    ("News", "news"),
                    ("Tutorial", "tutorial"),
                    ("Case Study", "case-study"),
                    ("Announcement", "announcement"),
                ])
                .synonyms(&[
                    ("how-to", "tutorial"),
                    ("guide", "tutorial"),
                    ("case study", "case-study"),
                    ("update", "announcement"),
                    ("press", "news"),
                ]),
            FieldDeclaration::new("status", FieldKind::Select)
                .options(&STATUS_OPTIONS)
                .synonyms(&STATUS_SYNONYMS)
                .default_value("draft"),
            FieldDeclaration::new("publishedAt", FieldKind::Date).aliases(&["publish date", "date"]),
            FieldDeclaration::new("featured", FieldKind::Checkbox),
            FieldDeclaration::new("readingTime", FieldKind::Number).aliases(&["minutes"]),
            FieldDeclaration::new("author", FieldKind::Relationship),
        ],
    )
    .with_label("Blog Posts")
    .with_slug("slug", "title")
    .with_rule(RowRule::new(
        "category-present",
        RuleCheck::Present("category".to_string()),
        "Blog posts require a category",
    ))
    .with_rule(RowRule::new(
        "body-not-empty",
        RuleCheck::NonEmpty("body".to_string()),
        "Blog posts require a non-empty body",
    ))
}

/// 商品集合
pub fn products() -> CollectionSchema {
    CollectionSchema::new(
        "products",
        vec![
            FieldDeclaration::new("name", FieldKind::Text)
                .required()
                .localized()
                .aliases(&["product name", "title"]),
            FieldDeclaration::new("slug", FieldKind::Text),
            FieldDeclaration::new("sku", FieldKind::Text)
                .label("SKU")
                .required()
                .aliases(&["article number", "item code"]),
            FieldDeclaration::new("price", FieldKind::Number)
                .required()
                .aliases(&["unit price", "cost"]),
            FieldDeclaration::new("inStock", FieldKind::Checkbox).aliases(&["available", "stock"]),
            FieldDeclaration::new("status", FieldKind::Select)
                .options(&STATUS_OPTIONS)
                .synonyms(&STATUS_SYNONYMS)
                .default_value("draft"),
            FieldDeclaration::new("description", FieldKind::RichText).localized(),
            FieldDeclaration::new("releaseDate", FieldKind::Date),
            FieldDeclaration::new("gallery", FieldKind::Upload),
        ],
    )
    .with_label("Products")
    .with_slug("slug", "name")
    .with_rule(RowRule::new(
        "price-positive",
        RuleCheck::PositiveNumber("price".to_string()),
        "Product price must be greater than zero",
    ))
}

// ==========================================
// CollectionRegistry - 集合注册表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    schemas: Vec<CollectionSchema>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置集合（posts / products）
    pub fn builtin() -> Self {
        Self {
            schemas: vec![posts(), products()],
        }
    }

    /// 注册集合；同名集合被替换
    pub fn register(&mut self, schema: CollectionSchema) {
        self.schemas.retain(|s| s.slug != schema.slug);
        self.schemas.push(schema);
    }

    pub fn get(&self, slug: &str) -> Option<&CollectionSchema> {
        self.schemas.iter().find(|s| s.slug == slug)
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.slug.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = CollectionRegistry::builtin();
        assert_eq!(registry.slugs(), vec!["posts", "products"]);
        assert!(registry.get("posts").is_some());
        assert!(registry.get("pages").is_none());
    }

    #[test]
    fn test_posts_mappings_skip_relationship() {
        let mappings = posts().field_mappings();
        assert!(mappings.iter().all(|m| m.canonical_field != "author"));
        assert_eq!(mappings.len(), 9);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = CollectionRegistry::builtin();
        registry.register(CollectionSchema::new("posts", vec![]));
        assert_eq!(registry.slugs(), vec!["products", "posts"]);
        assert!(registry.get("posts").unwrap().fields.is_empty());
    }
}
