//! Collection schema compilation.
//!
//! Recursively walks a collection's field tree (including brick definitions
//! and repeaters nested to unbounded depth) and emits a flat forest of table
//! descriptors with fully resolved columns, foreign keys, and deterministic
//! names. Pure and side-effect-free; the same definition always compiles to
//! an identical forest.

use indexmap::IndexMap;
use serde_json::json;
use smol_str::SmolStr;

use strata_schema::{
    Brick, COLLECTIONS_TABLE, Collection, ColumnDataType, DatabaseAdapter, FieldColumnShape,
    FieldDefinition, FieldNode, FieldType, ForeignKeyRef, LOCALES_TABLE,
};

use crate::error::{MigrateResult, MigrationError};
use crate::naming;
use crate::schema::{
    CollectionSchema, CollectionSchemaColumn, CollectionSchemaTable, ColumnSource, TableKey,
    TableType,
};

/// Compile a collection definition into its relational table forest.
///
/// `document_table` and `version_table` are the names of the externally
/// managed document and version tables the generated tables foreign-key to.
pub fn compile_collection(
    collection: &Collection,
    document_table: &str,
    version_table: &str,
    adapter: &dyn DatabaseAdapter,
) -> MigrateResult<CollectionSchema> {
    let ctx = CompileContext {
        document_table,
        version_table,
        adapter,
    };
    let mut tables = Vec::new();

    // The collection's own non-brick fields.
    compile_field_holder(
        &ctx,
        collection.key(),
        TableKey::document_fields(collection.key.clone()),
        TableType::DocumentFields,
        &collection.fields,
        &collection.layout,
        &mut tables,
    )?;

    // One brick table per attached brick, fixed or builder.
    for brick in &collection.bricks {
        compile_brick(&ctx, collection, brick, &mut tables)?;
    }

    tracing::debug!(
        collection = collection.key(),
        tables = tables.len(),
        "compiled collection schema"
    );

    Ok(CollectionSchema {
        key: collection.key.clone(),
        tables,
    })
}

struct CompileContext<'a> {
    document_table: &'a str,
    version_table: &'a str,
    adapter: &'a dyn DatabaseAdapter,
}

fn compile_brick(
    ctx: &CompileContext<'_>,
    collection: &Collection,
    brick: &Brick,
    tables: &mut Vec<CollectionSchemaTable>,
) -> MigrateResult<()> {
    compile_field_holder(
        ctx,
        brick.key(),
        TableKey::brick(collection.key.clone(), brick.key.clone()),
        TableType::Brick,
        &brick.fields,
        &brick.layout,
        tables,
    )
}

/// Compile a top-level field holder (document-fields or brick) and every
/// repeater table nested under it.
fn compile_field_holder(
    ctx: &CompileContext<'_>,
    owner: &str,
    key: TableKey,
    table_type: TableType,
    registry: &IndexMap<SmolStr, FieldDefinition>,
    layout: &[FieldNode],
    tables: &mut Vec<CollectionSchemaTable>,
) -> MigrateResult<()> {
    let name = naming::table_name(&key);

    let mut direct = Vec::new();
    let mut repeaters = Vec::new();
    collect_direct(registry, layout, owner, &mut direct, &mut repeaters)?;

    let mut columns = core_columns(ctx, table_type);
    for field in &direct {
        columns.extend(field_columns(ctx, field));
    }

    tables.push(CollectionSchemaTable {
        name: name.clone(),
        table_type,
        key: key.clone(),
        columns,
    });

    for node in repeaters {
        compile_repeater(ctx, owner, registry, node, &key, &name, &name, tables)?;
    }
    Ok(())
}

/// Compile one repeater table and recurse into repeaters nested inside its
/// group fields.
#[allow(clippy::too_many_arguments)]
fn compile_repeater(
    ctx: &CompileContext<'_>,
    owner: &str,
    registry: &IndexMap<SmolStr, FieldDefinition>,
    node: &FieldNode,
    parent_key: &TableKey,
    parent_table: &SmolStr,
    holder_table: &SmolStr,
    tables: &mut Vec<CollectionSchemaTable>,
) -> MigrateResult<()> {
    let key = parent_key.child_repeater(node.key.clone());
    let name = naming::table_name(&key);

    let mut direct = Vec::new();
    let mut repeaters = Vec::new();
    collect_direct(registry, &node.children, owner, &mut direct, &mut repeaters)?;

    let mut columns = core_columns(ctx, TableType::Repeater);

    // Every repeater row links back to its top-level brick/document-fields
    // row, regardless of nesting depth.
    columns.push(core_column(
        "brick_id",
        ColumnDataType::Integer,
        false,
        None,
        Some(ForeignKeyRef::cascade(holder_table.clone(), "id")),
    ));
    if key.depth() > 1 {
        columns.push(core_column(
            "parent_id",
            ColumnDataType::Integer,
            true,
            None,
            Some(ForeignKeyRef::cascade(parent_table.clone(), "id")),
        ));
        columns.push(core_column(
            "parent_id_ref",
            ColumnDataType::Integer,
            true,
            None,
            None,
        ));
    }
    for field in &direct {
        columns.extend(field_columns(ctx, field));
    }

    tables.push(CollectionSchemaTable {
        name: name.clone(),
        table_type: TableType::Repeater,
        key: key.clone(),
        columns,
    });

    for nested in repeaters {
        compile_repeater(ctx, owner, registry, nested, &key, &name, holder_table, tables)?;
    }
    Ok(())
}

/// Resolve one layout level into directly stored fields and repeater nodes,
/// flattening tabs in place. Fails on the first unresolvable field key.
fn collect_direct<'a>(
    registry: &'a IndexMap<SmolStr, FieldDefinition>,
    layout: &'a [FieldNode],
    owner: &str,
    direct: &mut Vec<&'a FieldDefinition>,
    repeaters: &mut Vec<&'a FieldNode>,
) -> MigrateResult<()> {
    for node in layout {
        let field = registry
            .get(&node.key)
            .ok_or_else(|| MigrationError::field_not_found(node.key.as_str(), owner))?;
        match field.field_type {
            FieldType::Tab => collect_direct(registry, &node.children, owner, direct, repeaters)?,
            FieldType::Repeater => repeaters.push(node),
            _ => direct.push(field),
        }
    }
    Ok(())
}

/// The fixed structural columns every generated table carries, plus the
/// extras for its table type.
fn core_columns(ctx: &CompileContext<'_>, table_type: TableType) -> Vec<CollectionSchemaColumn> {
    let mut columns = vec![
        CollectionSchemaColumn {
            name: SmolStr::new_static("id"),
            source: ColumnSource::Core,
            data_type: ColumnDataType::PrimaryKey,
            nullable: false,
            primary: true,
            default: None,
            foreign_key: None,
            field_type: None,
        },
        core_column(
            "collection_key",
            ColumnDataType::Text,
            false,
            None,
            Some(ForeignKeyRef::cascade(COLLECTIONS_TABLE, "key")),
        ),
        core_column(
            "document_id",
            ColumnDataType::Integer,
            false,
            None,
            Some(ForeignKeyRef::cascade(ctx.document_table, "id")),
        ),
        core_column(
            "document_version_id",
            ColumnDataType::Integer,
            false,
            None,
            Some(ForeignKeyRef::cascade(ctx.version_table, "id")),
        ),
        // One row exists per locale per logical field holder.
        core_column(
            "locale",
            ColumnDataType::Text,
            false,
            None,
            Some(ForeignKeyRef::cascade(LOCALES_TABLE, "code")),
        ),
        core_column("position", ColumnDataType::Integer, false, Some(json!(0)), None),
        core_column("is_open", ColumnDataType::Boolean, false, Some(json!(false)), None),
    ];

    match table_type {
        TableType::Brick => {
            columns.push(core_column("brick_type", ColumnDataType::Text, false, None, None));
            // Groups the locale rows of one logical brick instance.
            columns.push(core_column(
                "brick_instance_id",
                ColumnDataType::Integer,
                false,
                None,
                None,
            ));
            columns.push(core_column("brick_id_ref", ColumnDataType::Integer, true, None, None));
        }
        TableType::DocumentFields => {
            // Transient negative placeholder used by the bricks writer to
            // stitch repeater child rows within one insert batch.
            columns.push(core_column("brick_id_ref", ColumnDataType::Integer, true, None, None));
        }
        _ => {}
    }
    columns
}

fn core_column(
    name: &str,
    data_type: ColumnDataType,
    nullable: bool,
    default: Option<serde_json::Value>,
    foreign_key: Option<ForeignKeyRef>,
) -> CollectionSchemaColumn {
    CollectionSchemaColumn {
        name: SmolStr::from(name),
        source: ColumnSource::Core,
        data_type,
        nullable,
        primary: false,
        default,
        foreign_key,
        field_type: None,
    }
}

/// Column name for one shape of a field. Multi-column fields distinguish
/// their columns with a shape suffix so names stay unique within the table.
fn shape_column_name(field_key: &str, shape: &FieldColumnShape) -> SmolStr {
    match &shape.name_suffix {
        Some(suffix) => naming::field_column_name(&format!("{field_key}_{suffix}")),
        None => naming::field_column_name(field_key),
    }
}

/// Columns a single custom field contributes, with prefixed names.
fn field_columns(
    ctx: &CompileContext<'_>,
    field: &FieldDefinition,
) -> Vec<CollectionSchemaColumn> {
    field
        .schema_definition(ctx.adapter)
        .columns
        .into_iter()
        .map(|shape| CollectionSchemaColumn {
            name: shape_column_name(field.key(), &shape),
            source: ColumnSource::Field,
            data_type: shape.data_type,
            nullable: shape.nullable,
            primary: false,
            default: shape.default,
            foreign_key: shape.foreign_key,
            field_type: Some(field.field_type),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use strata_schema::{BrickMode, SqliteAdapter};

    use super::*;
    use crate::priority::table_priority;

    fn blog() -> Collection {
        Collection::builder("blog")
            .field(FieldDefinition::text("title").required(true))
            .brick(
                Brick::builder("hero", BrickMode::Builder)
                    .repeater("items", |r| r.field(FieldDefinition::text("label")))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn compile(collection: &Collection) -> CollectionSchema {
        compile_collection(
            collection,
            "strata_document__blog",
            "strata_document__blog__versions",
            &SqliteAdapter,
        )
        .unwrap()
    }

    #[test]
    fn test_blog_scenario_tables_and_priorities() {
        let schema = compile(&blog());

        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "strata_document__blog__fields",
                "strata_document__blog__hero",
                "strata_document__blog__hero__items",
            ]
        );

        let priorities: Vec<u32> = schema
            .tables
            .iter()
            .map(|t| table_priority(t.table_type, &t.key).unwrap())
            .collect();
        assert_eq!(priorities, vec![1, 1, 2]);

        // Depth-1 repeaters link to their holder but have no repeater parent.
        let items = schema.table("strata_document__blog__hero__items").unwrap();
        let brick_id = items.column("brick_id").unwrap();
        assert_eq!(
            brick_id.foreign_key.as_ref().unwrap().table,
            "strata_document__blog__hero"
        );
        assert!(items.column("parent_id").is_none());
        assert!(items.column("parent_id_ref").is_none());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let collection = blog();
        let a = compile(&collection);
        let b = compile(&collection);
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_table_has_exactly_one_primary_column() {
        let schema = compile(&blog());
        for table in &schema.tables {
            let primaries = table.columns.iter().filter(|c| c.primary).count();
            assert_eq!(primaries, 1, "table {}", table.name);
            assert_eq!(table.primary_column().unwrap().name, "id");
        }
    }

    #[test]
    fn test_core_columns_present_on_every_table() {
        let schema = compile(&blog());
        for table in &schema.tables {
            for core in [
                "id",
                "collection_key",
                "document_id",
                "document_version_id",
                "locale",
                "position",
                "is_open",
            ] {
                assert!(table.column(core).is_some(), "{} missing {core}", table.name);
            }
        }
    }

    #[test]
    fn test_brick_table_extras() {
        let schema = compile(&blog());
        let hero = schema.table("strata_document__blog__hero").unwrap();
        assert!(hero.column("brick_type").is_some());
        assert!(hero.column("brick_instance_id").is_some());
        assert!(hero.column("brick_id_ref").is_some());

        let fields = schema.table("strata_document__blog__fields").unwrap();
        assert!(fields.column("brick_id_ref").is_some());
        assert!(fields.column("brick_type").is_none());
        assert!(fields.column("brick_instance_id").is_none());
    }

    #[test]
    fn test_field_columns_are_prefixed() {
        let schema = compile(&blog());
        let fields = schema.table("strata_document__blog__fields").unwrap();
        let title = fields.column("_title").unwrap();
        assert_eq!(title.source, ColumnSource::Field);
        assert_eq!(title.field_type, Some(FieldType::Text));
        assert!(!title.nullable);
    }

    #[test]
    fn test_nested_repeater_gets_parent_link() {
        let collection = Collection::builder("blog")
            .brick(
                Brick::builder("hero", BrickMode::Fixed)
                    .repeater("items", |r| {
                        r.field(FieldDefinition::text("label"))
                            .repeater("nested_items", |n| n.field(FieldDefinition::number("rank")))
                    })
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let schema = compile(&collection);

        let nested = schema
            .table("strata_document__blog__hero__items__nested_items")
            .unwrap();
        assert_eq!(nested.key.repeater.len(), 2);
        assert_eq!(
            nested.column("brick_id").unwrap().foreign_key.as_ref().unwrap().table,
            "strata_document__blog__hero"
        );
        assert_eq!(
            nested.column("parent_id").unwrap().foreign_key.as_ref().unwrap().table,
            "strata_document__blog__hero__items"
        );
        assert!(nested.column("parent_id_ref").is_some());
        assert_eq!(
            table_priority(nested.table_type, &nested.key).unwrap(),
            3
        );
    }

    #[test]
    fn test_tab_fields_flatten_into_owner_table() {
        let collection = Collection::builder("page")
            .tab("seo", |t| {
                t.field(FieldDefinition::text("meta_title"))
                    .repeater("keywords", |r| r.field(FieldDefinition::text("word")))
            })
            .build()
            .unwrap();
        let schema = compile_collection(
            &collection,
            "strata_document__page",
            "strata_document__page__versions",
            &SqliteAdapter,
        )
        .unwrap();

        let fields = schema.table("strata_document__page__fields").unwrap();
        assert!(fields.column("_meta_title").is_some());
        // The tab itself produces no column and no table.
        assert!(fields.column("_seo").is_none());
        assert!(schema.table("strata_document__page__fields__keywords").is_some());
        assert_eq!(schema.tables.len(), 2);
    }

    #[test]
    fn test_unresolvable_field_key_aborts_compile() {
        let mut collection = blog();
        collection.layout.push(FieldNode::leaf("ghost"));

        let err = compile_collection(
            &collection,
            "strata_document__blog",
            "strata_document__blog__versions",
            &SqliteAdapter,
        )
        .unwrap_err();
        match err {
            MigrationError::FieldNotFound { field, owner } => {
                assert_eq!(field, "ghost");
                assert_eq!(owner, "blog");
            }
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_key_inside_brick_names_the_brick() {
        let mut collection = blog();
        collection.bricks[0].layout.push(FieldNode::leaf("ghost"));

        let err = compile_collection(
            &collection,
            "strata_document__blog",
            "strata_document__blog__versions",
            &SqliteAdapter,
        )
        .unwrap_err();
        match err {
            MigrationError::FieldNotFound { owner, .. } => assert_eq!(owner, "hero"),
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_media_field_foreign_key_survives_compilation() {
        let collection = Collection::builder("gallery")
            .field(FieldDefinition::media("cover"))
            .build()
            .unwrap();
        let schema = compile_collection(
            &collection,
            "strata_document__gallery",
            "strata_document__gallery__versions",
            &SqliteAdapter,
        )
        .unwrap();

        let cover = schema.tables[0].column("_cover").unwrap();
        let fk = cover.foreign_key.as_ref().unwrap();
        assert_eq!(fk.table, "strata_media");
        assert_eq!(fk.on_delete, strata_schema::OnDeleteAction::SetNull);
    }

    #[test]
    fn test_multi_column_shapes_get_distinct_names() {
        // Custom field crates may contribute several columns per field; the
        // shape suffix keeps their names unique within the table.
        let plain = FieldColumnShape {
            name_suffix: None,
            data_type: ColumnDataType::Text,
            nullable: true,
            default: None,
            foreign_key: None,
        };
        let suffixed = FieldColumnShape {
            name_suffix: Some("alt".into()),
            ..plain.clone()
        };

        assert_eq!(shape_column_name("image", &plain), "_image");
        assert_eq!(shape_column_name("image", &suffixed), "_image_alt");
        assert_ne!(
            shape_column_name("image", &plain),
            shape_column_name("image", &suffixed)
        );
    }
}
