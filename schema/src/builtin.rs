//! Connector definitions bundled with the application. User-supplied registry
//! files overlay these at startup.

use crate::{ConnectorRegistry, ConnectorSchema, FieldSchema, FieldValue, SubSchema};

fn sub(key: &str, extras: Vec<FieldSchema>, doc: Option<&str>) -> SubSchema {
    SubSchema {
        key: key.to_string(),
        extras,
        doc: doc.map(str::to_string),
    }
}

fn demo() -> ConnectorSchema {
    ConnectorSchema {
        globals: Vec::new(),
        subs: vec![
            sub(
                "Example Submodule",
                Vec::new(),
                Some(
                    "This is an example submodule.\n\n\
                     It demonstrates how to use **bold** text, *italic* text, \
                     and [links](https://example.com).\n\n\
                     ```python\nprint(\"Hello, World!\")\n```\n\n\
                     You can also include lists:\n\n\
                     - Item 1\n- Item 2\n- Item 3",
                ),
            ),
            sub(
                "Python - Hello World",
                vec![FieldSchema::text("code", "Hello, World!")],
                None,
            ),
            sub(
                "Python - Add Numbers (Integers)",
                vec![
                    FieldSchema::new("a", "int", Some(FieldValue::Number(1.0))),
                    FieldSchema::new("b", "int", Some(FieldValue::Number(1.0))),
                ],
                None,
            ),
            sub(
                "Python - Add Numbers (Floats)",
                vec![
                    FieldSchema::new("a", "float", Some(FieldValue::Number(1.0))),
                    FieldSchema::new("b", "float", Some(FieldValue::Number(1.0))),
                ],
                None,
            ),
            sub(
                "rot13",
                vec![FieldSchema::text("text", "Hello, World!")],
                None,
            ),
        ],
    }
}

fn smb() -> ConnectorSchema {
    let doc = Some("Enumerating and mapping the SMB protocol");
    ConnectorSchema {
        globals: vec![
            FieldSchema::text("host", ""),
            FieldSchema::text("username", ""),
            FieldSchema::text("password", ""),
        ],
        subs: vec![
            sub(
                "List Shares (NetExec)",
                vec![
                    FieldSchema::flag("is_ntlm", false),
                    FieldSchema::flag("kerberos", false),
                ],
                doc,
            ),
            sub("List Shares (SMBClient)", Vec::new(), doc),
        ],
    }
}

fn bloodhound() -> ConnectorSchema {
    ConnectorSchema {
        globals: vec![
            FieldSchema::text("domain", ""),
            FieldSchema::text("username", ""),
            FieldSchema::text("password", ""),
            FieldSchema::flag("kerberos", false),
        ],
        subs: vec![
            // The double space in the key is part of the registered name; the
            // preview endpoint matches it byte for byte.
            sub(
                "Collection  (BloodHound.py)",
                vec![
                    FieldSchema::text("nameserver", ""),
                    FieldSchema::flag("verbose", false),
                ],
                Some(
                    "Collects BloodHound (Legacy) data using \
                     [bloodhound-python](https://github.com/dirkjanm/BloodHound.py)",
                ),
            ),
            sub("Collection (NetExec)", Vec::new(), None),
            sub(
                "Collection (SharpHound)",
                vec![FieldSchema::text("output", "")],
                None,
            ),
        ],
    }
}

fn delegations() -> ConnectorSchema {
    // Every sub parameter is also a global, so the subs carry no extras.
    ConnectorSchema {
        globals: vec![
            FieldSchema::text("dc_host", ""),
            FieldSchema::text("domain", ""),
            FieldSchema::text("username", ""),
            FieldSchema::text("password", ""),
            FieldSchema::flag("is_ntlm", false),
        ],
        subs: vec![
            sub("Find Delegations (NetExec)", Vec::new(), None),
            sub("Find Delegations (findDelegation.py)", Vec::new(), None),
        ],
    }
}

impl ConnectorRegistry {
    pub fn builtin() -> Self {
        let mut registry = ConnectorRegistry::new();
        registry.insert("Demo", demo());
        registry.insert("SMB", smb());
        registry.insert("BloodHound", bloodhound());
        registry.insert("Delegations", delegations());
        registry
    }
}
