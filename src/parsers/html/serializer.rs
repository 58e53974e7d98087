//! DOM 序列化

use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

/// 序列化整个文档，并按指定编码输出字节
pub fn serialize_document(dom: RcDom, document_encoding: String) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .expect("Unable to serialize DOM into buffer");

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    buf
}

/// 序列化单个节点（含节点本身的标签）
pub fn serialize_node(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &serializable,
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )
    .expect("Unable to serialize DOM node into buffer");

    String::from_utf8_lossy(&buf).into_owned()
}

/// 序列化节点的子节点（不含节点本身的标签）
pub fn serialize_children(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = node.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .expect("Unable to serialize DOM node into buffer");

    String::from_utf8_lossy(&buf).into_owned()
}
