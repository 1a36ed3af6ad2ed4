//! Search and paging over a packet collection

use crate::packet::Packet;

/// Default number of packets per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Filter packets by a case-insensitive substring query.
///
/// A packet matches when any of id, source, destination, protocol or
/// timestamp contains the query. An empty query keeps everything.
pub fn filter_packets<'a>(packets: &'a [Packet], query: &str) -> Vec<&'a Packet> {
    if query.is_empty() {
        return packets.iter().collect();
    }
    let query_lower = query.to_lowercase();
    packets
        .iter()
        .filter(|p| matches_query(p, &query_lower))
        .collect()
}

fn matches_query(packet: &Packet, query_lower: &str) -> bool {
    [
        Some(packet.id()),
        Some(packet.source()),
        Some(packet.destination()),
        Some(packet.protocol()),
        packet.timestamp(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(query_lower))
}

/// Number of pages needed for `len` items
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slice out page `page` (1-based), clipped to the bounds of `items`
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = page.saturating_mul(page_size).min(items.len());
    &items[start..end]
}

/// Query and page cursor for the capture list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketBrowser {
    query: String,
    page: usize,
    page_size: usize,
}

impl Default for PacketBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PacketBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the search query. Always returns to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.page = 1;
    }

    /// Packets matching the current query
    pub fn filtered<'a>(&self, packets: &'a [Packet]) -> Vec<&'a Packet> {
        filter_packets(packets, &self.query)
    }

    pub fn total_pages(&self, packets: &[Packet]) -> usize {
        page_count(self.filtered(packets).len(), self.page_size)
    }

    /// Packets on the current page
    pub fn visible<'a>(&self, packets: &'a [Packet]) -> Vec<&'a Packet> {
        let filtered = self.filtered(packets);
        paginate(&filtered, self.page_size, self.page).to_vec()
    }

    /// Jump to `page`, clamped to the available pages
    pub fn go_to(&mut self, page: usize, packets: &[Packet]) {
        let last = self.total_pages(packets).max(1);
        self.page = page.clamp(1, last);
    }

    pub fn next_page(&mut self, packets: &[Packet]) {
        self.go_to(self.page.saturating_add(1), packets);
    }

    pub fn prev_page(&mut self, packets: &[Packet]) {
        self.go_to(self.page.saturating_sub(1), packets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(id: &str, source: &str, protocol: &str, timestamp: Option<&str>) -> Packet {
        Packet::new(id, source, "10.0.0.1", protocol, "00ff", timestamp.map(String::from)).unwrap()
    }

    fn sample() -> Vec<Packet> {
        vec![
            packet("pkt-1", "192.168.1.5", "TCP", Some("2024-01-01 10:00:00")),
            packet("pkt-2", "192.168.1.77", "UDP", None),
            packet("manual-3", "N/A (Manual)", "RAW", Some("2024-02-02 11:00:00")),
            packet("pkt-4", "192.168.1.9", "DNS", None),
        ]
    }

    fn ids(packets: &[&Packet]) -> Vec<String> {
        packets.iter().map(|p| p.id().to_string()).collect()
    }

    #[test]
    fn test_empty_query_keeps_order() {
        let packets = sample();
        let filtered = filter_packets(&packets, "");
        assert_eq!(ids(&filtered), vec!["pkt-1", "pkt-2", "manual-3", "pkt-4"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let packets = sample();
        assert_eq!(ids(&filter_packets(&packets, "udp")), vec!["pkt-2"]);
        assert_eq!(ids(&filter_packets(&packets, "MANUAL")), vec!["manual-3"]);
    }

    #[test]
    fn test_query_matches_any_field() {
        let packets = sample();
        // source
        assert_eq!(ids(&filter_packets(&packets, "1.77")), vec!["pkt-2"]);
        // destination is shared by all
        assert_eq!(filter_packets(&packets, "10.0.0.1").len(), 4);
        // timestamp
        assert_eq!(ids(&filter_packets(&packets, "2024-02")), vec!["manual-3"]);
        assert!(filter_packets(&packets, "icmp").is_empty());
    }

    #[test]
    fn test_hex_payload_is_not_searched() {
        let packets = sample();
        assert!(filter_packets(&packets, "00ff").is_empty());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(49, 10), 5);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_paginate_pages_cover_items() {
        let items: Vec<usize> = (0..23).collect();
        let pages = page_count(items.len(), 10);
        assert_eq!(pages, 3);
        assert_eq!(paginate(&items, 10, 1), &items[0..10]);
        assert_eq!(paginate(&items, 10, 2), &items[10..20]);
        assert_eq!(paginate(&items, 10, 3).len(), 23 % 10);
        assert!(paginate(&items, 10, 4).is_empty());

        let even: Vec<usize> = (0..20).collect();
        assert_eq!(paginate(&even, 10, 2).len(), 10);
    }

    #[test]
    fn test_paginate_edge_cases() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 2, 0), &[1, 2]);
        assert!(paginate(&items, 0, 1).is_empty());
        assert!(paginate::<u8>(&[], 10, 1).is_empty());
        assert!(paginate(&items, 2, usize::MAX).is_empty());
    }

    #[test]
    fn test_browser_query_resets_page() {
        let packets: Vec<Packet> = (0..25)
            .map(|i| packet(&format!("pkt-{}", i), "192.168.1.1", "TCP", None))
            .collect();
        let mut browser = PacketBrowser::new(10);
        browser.next_page(&packets);
        browser.next_page(&packets);
        assert_eq!(browser.page(), 3);

        browser.set_query("pkt");
        assert_eq!(browser.page(), 1);

        browser.next_page(&packets);
        browser.set_query("pkt");
        assert_eq!(browser.page(), 1);
    }

    #[test]
    fn test_browser_page_clamping() {
        let packets: Vec<Packet> = (0..25)
            .map(|i| packet(&format!("pkt-{}", i), "192.168.1.1", "TCP", None))
            .collect();
        let mut browser = PacketBrowser::new(10);
        browser.prev_page(&packets);
        assert_eq!(browser.page(), 1);

        browser.go_to(99, &packets);
        assert_eq!(browser.page(), 3);
        assert_eq!(browser.visible(&packets).len(), 5);

        browser.next_page(&packets);
        assert_eq!(browser.page(), 3);
    }

    #[test]
    fn test_browser_visible_uses_filter() {
        let packets = sample();
        let mut browser = PacketBrowser::new(2);
        assert_eq!(browser.total_pages(&packets), 2);
        browser.set_query("192.168");
        assert_eq!(ids(&browser.visible(&packets)), vec!["pkt-1", "pkt-2"]);
        browser.next_page(&packets);
        assert_eq!(ids(&browser.visible(&packets)), vec!["pkt-4"]);
    }

    #[test]
    fn test_browser_with_no_packets() {
        let mut browser = PacketBrowser::default();
        assert_eq!(browser.page_size(), DEFAULT_PAGE_SIZE);
        browser.next_page(&[]);
        assert_eq!(browser.page(), 1);
        assert!(browser.visible(&[]).is_empty());
    }
}
