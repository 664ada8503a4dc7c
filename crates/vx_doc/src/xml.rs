// crates/vx_doc/src/xml.rs

//! 保序 XML 元素树
//!
//! 求解器输入文档需要就地修改若干子树并保持其余部分的兄弟顺序，
//! 因此解析为持有所有权的元素树：属性与子元素都按文档顺序存储。
//! 解析使用 quick-xml 事件流；序列化为制表符缩进的规范格式，
//! 同一棵树两次序列化字节一致。
//!
//! 注释与处理指令在解析时丢弃；求解器方言不依赖它们。

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{DocError, DocResult};

/// XML 元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// 标签名
    pub tag: String,
    /// 属性（文档顺序）
    pub attrs: Vec<(String, String)>,
    /// 文本内容（去除首尾空白后非空才保留）
    pub text: String,
    /// 子元素（文档顺序）
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// 创建空元素
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// 链式设置属性
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// 链式设置文本
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// 读取属性值
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 设置属性值（已存在则覆盖，保持原位置）
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.attrs.push((key, value));
        }
    }

    /// `name` 属性的便捷读取
    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    /// 第一个指定标签的子元素
    pub fn find(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// 第一个指定标签的子元素（可变）
    pub fn find_mut(&mut self, tag: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    /// 所有指定标签的子元素
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// 按标签与 `name` 属性查找子元素
    pub fn find_by_name(&self, tag: &str, name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|c| c.tag == tag && c.name() == Some(name))
    }

    /// 按标签与 `name` 属性查找子元素（可变）
    pub fn find_by_name_mut(&mut self, tag: &str, name: &str) -> Option<&mut XmlElement> {
        self.children
            .iter_mut()
            .find(|c| c.tag == tag && c.name() == Some(name))
    }

    /// 递归收集所有指定标签的后代（含自身）
    pub fn find_all_deep<'a>(&'a self, tag: &str, out: &mut Vec<&'a XmlElement>) {
        if self.tag == tag {
            out.push(self);
        }
        for child in &self.children {
            child.find_all_deep(tag, out);
        }
    }

    /// 递归查找第一个满足条件的后代（可变）
    pub fn find_deep_mut(
        &mut self,
        pred: &dyn Fn(&XmlElement) -> bool,
    ) -> Option<&mut XmlElement> {
        if pred(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Some(found) = child.find_deep_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    /// 追加子元素
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// 清空子元素与文本
    pub fn clear_content(&mut self) {
        self.children.clear();
        self.text.clear();
    }

    /// 文本按逗号/空白切分并解析
    pub fn parse_text_list<T: std::str::FromStr>(&self) -> DocResult<Vec<T>> {
        self.text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|_| DocError::parse(format!("cannot parse '{}' in <{}>", s, self.tag)))
            })
            .collect()
    }

    /// 序列化整棵子树（含 XML 声明），两次调用字节一致
    pub fn to_document_string(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write_into(&mut out, 0);
        out
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push('\t');
        }
        out.push('<');
        out.push_str(&self.tag);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_into(v, true, out);
            out.push('"');
        }

        if self.children.is_empty() && self.text.is_empty() {
            out.push_str("/>\n");
            return;
        }

        if self.children.is_empty() {
            out.push('>');
            escape_into(&self.text, false, out);
            out.push_str("</");
            out.push_str(&self.tag);
            out.push_str(">\n");
            return;
        }

        out.push_str(">\n");
        if !self.text.is_empty() {
            for _ in 0..=depth {
                out.push('\t');
            }
            escape_into(&self.text, false, out);
            out.push('\n');
        }
        for child in &self.children {
            child.write_into(out, depth + 1);
        }
        for _ in 0..depth {
            out.push('\t');
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push_str(">\n");
    }
}

fn escape_into(s: &str, attr: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// 解析 XML 文档为元素树
pub fn parse_document(content: &str) -> DocResult<XmlElement> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DocError::parse(e.to_string()))?;
        match event {
            Event::Start(start) => {
                let elem = element_from_start(&start)?;
                stack.push(elem);
            }
            Event::Empty(start) => {
                let elem = element_from_start(&start)?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::End(_) => {
                let elem = stack
                    .pop()
                    .ok_or_else(|| DocError::parse("unbalanced end tag"))?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| DocError::parse(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(value.trim());
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            // 声明、注释、处理指令对求解器方言没有意义
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DocError::parse("unclosed elements at end of document"));
    }
    root.ok_or_else(|| DocError::parse("document has no root element"))
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> DocResult<XmlElement> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut elem = XmlElement::new(tag);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocError::parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DocError::parse(e.to_string()))?
            .into_owned();
        elem.attrs.push((key, value));
    }
    Ok(elem)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    elem: XmlElement,
) -> DocResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(elem);
        Ok(())
    } else if root.is_none() {
        *root = Some(elem);
        Ok(())
    } else {
        Err(DocError::parse("multiple root elements"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<febio_spec version="4.0">
    <Mesh>
        <Nodes name="RUBBER_OBJ">
            <node id="1">0.0,0.0,0.0</node>
            <node id="2">1.0,0.0,0.0</node>
        </Nodes>
        <Surface name="TOP"/>
    </Mesh>
    <Control>
        <time_steps>20</time_steps>
    </Control>
</febio_spec>"#;

    #[test]
    fn test_parse_structure() {
        let root = parse_document(SAMPLE).unwrap();
        assert_eq!(root.tag, "febio_spec");
        assert_eq!(root.attr("version"), Some("4.0"));

        let mesh = root.find("Mesh").unwrap();
        let nodes = mesh.find_by_name("Nodes", "RUBBER_OBJ").unwrap();
        assert_eq!(nodes.children.len(), 2);
        assert_eq!(nodes.children[0].attr("id"), Some("1"));
        assert_eq!(nodes.children[0].text, "0.0,0.0,0.0");
    }

    #[test]
    fn test_parse_text_list() {
        let root = parse_document(SAMPLE).unwrap();
        let node = &root.find("Mesh").unwrap().find("Nodes").unwrap().children[1];
        let coords: Vec<f64> = node.parse_text_list().unwrap();
        assert_eq!(coords, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_roundtrip_deterministic() {
        let root = parse_document(SAMPLE).unwrap();
        let once = root.to_document_string();
        let reparsed = parse_document(&once).unwrap();
        assert_eq!(reparsed, root);
        assert_eq!(reparsed.to_document_string(), once);
    }

    #[test]
    fn test_sibling_order_preserved() {
        let root = parse_document(SAMPLE).unwrap();
        let mesh = root.find("Mesh").unwrap();
        let tags: Vec<&str> = mesh.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["Nodes", "Surface"]);
    }

    #[test]
    fn test_find_all_deep() {
        let doc = r#"<root><Step><step><Control><time_steps>5</time_steps></Control></step></Step><Control><time_steps>10</time_steps></Control></root>"#;
        let root = parse_document(doc).unwrap();
        let mut controls = Vec::new();
        root.find_all_deep("Control", &mut controls);
        assert_eq!(controls.len(), 2);
    }

    #[test]
    fn test_escaping() {
        let mut elem = XmlElement::new("note");
        elem.set_attr("label", "a<b&\"c\"");
        elem.text = "1 < 2 & 3".to_string();
        let s = elem.to_document_string();
        assert!(s.contains("a&lt;b&amp;&quot;c&quot;"));
        assert!(s.contains("1 &lt; 2 &amp; 3"));

        let reparsed = parse_document(&s).unwrap();
        assert_eq!(reparsed.attr("label"), Some("a<b&\"c\""));
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("").is_err());
    }
}
