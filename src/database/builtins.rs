use super::{Database, Modifiers, Property, TypeDef, TypeId};

/// (name, variant code) for primitive value types.
const PRIMITIVES: &[(&str, Option<&str>)] = &[
    ("void", Some("VT_Invalid")),
    ("bool", Some("VT_Bool")),
    ("int", Some("VT_Int32")),
    ("float", Some("VT_Float")),
    ("unsigned", Some("VT_UInt32")),
    ("uint8_t", None),
    ("int8_t", None),
    ("uint16_t", Some("VT_UShort")),
    ("int16_t", Some("VT_Short")),
    ("uint32_t", Some("VT_UInt32")),
    ("uint64_t", Some("VT_UInt64")),
    ("int64_t", Some("VT_Int64")),
    ("double", Some("VT_Double")),
    ("size_t", None),
    ("std::string", Some("VT_String")),
    ("String", Some("VT_String")),
    ("StringHash", Some("VT_StringHash")),
    ("Variant", None),
    ("VariantVector", Some("VT_VariantVector")),
    ("VariantMap", Some("VT_VariantMap")),
];

/// (name, variant code, component type, components) for math aggregates.
const VECTORS: &[(&str, &str, &str, &[&str])] = &[
    ("IntVector2", "VT_IntVector2", "int", &["x_", "y_"]),
    ("IntVector3", "VT_IntVector3", "int", &["x_", "y_", "z_"]),
    ("IntRect", "VT_IntRect", "int", &["left_", "top_", "right_", "bottom_"]),
    ("Rect", "VT_Rect", "float", &["Left()", "Top()", "Right()", "Bottom()"]),
    ("Vector2", "VT_Vector2", "float", &["x_", "y_"]),
    ("Vector3", "VT_Vector3", "float", &["x_", "y_", "z_"]),
    ("Vector4", "VT_Vector4", "float", &["x_", "y_", "z_", "w_"]),
    ("Quaternion", "VT_Quat", "float", &["x_", "y_", "z_", "w_"]),
    ("Color", "VT_Color", "float", &["r_", "g_", "b_", "a_"]),
];

/// Math types known by name only.
const OPAQUE: &[&str] = &[
    "float2", "float3", "float4", "rgba", "Quat", "float3x3", "float3x4", "float4x4",
];

const TEMPLATES: &[(&str, Option<&str>)] = &[
    ("SharedPtr", Some("VT_SharedPtr")),
    ("Vector", None),
    ("PODVector", None),
    ("HashMap", None),
    ("std::vector", None),
    ("std::array", None),
    ("std::set", None),
    ("std::unordered_map", None),
    ("std::map", None),
];

impl Database {
    /// A database pre-seeded with the built-in primitive, math and container
    /// types that scanned headers refer to without declaring.
    pub fn with_builtins() -> Self {
        let mut db = Database::new();

        for &(name, variant) in PRIMITIVES {
            db.add_internal(name, variant, true, false);
        }

        for &(name, variant, component, fields) in VECTORS {
            let id = db.add_internal(name, Some(variant), true, false);
            let component = db.reference(component);
            let def = db.get_mut(id);
            def.flags.is_vector = true;
            for field in fields {
                let mut property = Property::new(*field, component);
                property.modifiers = Modifiers::public();
                def.properties.push(property);
            }
        }

        for name in OPAQUE {
            db.add_internal(name, None, false, false);
        }

        for &(name, variant) in TEMPLATES {
            db.add_internal(name, variant, false, true);
        }

        db
    }

    fn add_internal(
        &mut self,
        name: &str,
        variant: Option<&str>,
        is_primitive: bool,
        is_template: bool,
    ) -> TypeId {
        let mut def = TypeDef::new(name);
        def.variant_type = variant.map(str::to_string);
        def.flags.is_internal = true;
        def.flags.is_primitive = is_primitive;
        def.flags.is_template = is_template;
        self.register(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_internal() {
        let db = Database::with_builtins();
        let void = db.find("void").unwrap();
        assert!(void.flags.is_primitive && void.flags.is_internal);
        assert_eq!(void.variant_type.as_deref(), Some("VT_Invalid"));

        let vector = db.find("std::vector").unwrap();
        assert!(vector.flags.is_template && !vector.flags.is_primitive);
        assert!(db.user_types().is_empty());
    }

    #[test]
    fn test_vector_components() {
        let db = Database::with_builtins();
        let color = db.find("Color").unwrap();
        assert!(color.flags.is_vector);
        let names: Vec<_> = color.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["r_", "g_", "b_", "a_"]);
        assert_eq!(db.name(color.properties[0].ty), "float");
    }
}
