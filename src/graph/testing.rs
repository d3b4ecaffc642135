use super::source::{ConnectionRecord, EntityRecord, GraphData};

pub(crate) fn record(id: &str) -> EntityRecord {
    EntityRecord {
        id: id.to_owned(),
        name: id.to_uppercase(),
        kind: None,
        shape: None,
        subtitle: None,
        description: None,
        url: None,
    }
}

pub(crate) fn connection(source: &str, target: &str) -> ConnectionRecord {
    ConnectionRecord {
        source: source.to_owned(),
        target: target.to_owned(),
        value: None,
        kind: None,
        label: None,
    }
}

/// First id becomes the anchor (`center`) record.
pub(crate) fn sample_data(ids: &[&str], links: &[(&str, &str)]) -> GraphData {
    let (first, rest) = ids.split_first().expect("at least one entity");
    let mut center = record(first);
    center.kind = Some("person".to_owned());

    GraphData {
        center,
        nodes: rest.iter().map(|id| record(id)).collect(),
        connections: links
            .iter()
            .map(|(source, target)| connection(source, target))
            .collect(),
        visual_settings: None,
    }
}
