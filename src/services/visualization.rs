//! 图表生命周期 - 业务能力层
//!
//! 两个固定槽位（趋势图、构成图），每个槽位最多一个存活的图表实例。
//! 重新绑定时先释放旧实例再创建新实例，由 `bind` 内部保证，不依赖调用方。

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::error::AppResult;
use crate::models::{LandCover, TimeSeries};

/// 图表槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Trend,
    Composition,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Trend, Slot::Composition];

    fn index(self) -> usize {
        match self {
            Slot::Trend => 0,
            Slot::Composition => 1,
        }
    }

    /// 面板中图表区域的元素 id
    pub fn element_id(self) -> &'static str {
        match self {
            Slot::Trend => "timeseries-chart",
            Slot::Composition => "pie-chart",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Trend => f.write_str("trend"),
            Slot::Composition => f.write_str("composition"),
        }
    }
}

/// 绑定到槽位的数据
#[derive(Debug, Clone, PartialEq)]
pub enum ChartDataset {
    Trend(TimeSeries),
    Composition(LandCover),
}

/// 图表的静态图像（导出用）
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenImage {
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrozenImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

/// 图表后端
///
/// `create` 产生一个存活实例，`release` 负责归还其占用的资源。
pub trait ChartBackend {
    type Chart;

    fn create(&mut self, slot: Slot, dataset: &ChartDataset) -> AppResult<Self::Chart>;

    /// 生成静态图像，不改变存活实例
    fn snapshot(&self, chart: &Self::Chart) -> AppResult<FrozenImage>;

    fn release(&mut self, chart: Self::Chart);
}

/// 图表生命周期管理
pub struct VisualizationLifecycle<B: ChartBackend> {
    backend: B,
    slots: [Option<B::Chart>; 2],
}

impl<B: ChartBackend> VisualizationLifecycle<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: [None, None],
        }
    }

    /// 绑定数据到槽位
    ///
    /// 先释放槽位中已有的实例，再创建新实例；创建失败时槽位保持为空
    pub fn bind(&mut self, slot: Slot, dataset: ChartDataset) -> AppResult<()> {
        self.clear(slot);
        let chart = self.backend.create(slot, &dataset)?;
        self.slots[slot.index()] = Some(chart);
        debug!("图表槽位 {} 已绑定", slot);
        Ok(())
    }

    /// 槽位当前内容的静态图像；空槽位返回 `None`
    pub fn render(&self, slot: Slot) -> AppResult<Option<FrozenImage>> {
        self.slots[slot.index()]
            .as_ref()
            .map(|chart| self.backend.snapshot(chart))
            .transpose()
    }

    /// 释放槽位中的实例
    pub fn clear(&mut self, slot: Slot) {
        if let Some(chart) = self.slots[slot.index()].take() {
            self.backend.release(chart);
            debug!("图表槽位 {} 已释放", slot);
        }
    }

    pub fn clear_all(&mut self) {
        for slot in Slot::ALL {
            self.clear(slot);
        }
    }

    pub fn is_bound(&self, slot: Slot) -> bool {
        self.slots[slot.index()].is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChartBackend> Drop for VisualizationLifecycle<B> {
    fn drop(&mut self) {
        self.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::models::{LatLon, YearValue};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// 记录每个槽位存活实例数量的后端
    #[derive(Default)]
    struct CountingBackend {
        live: Rc<RefCell<[usize; 2]>>,
        peak: Rc<RefCell<usize>>,
        created: usize,
        fail_next: bool,
    }

    struct CountedChart {
        slot: Slot,
        serial: usize,
    }

    impl ChartBackend for CountingBackend {
        type Chart = CountedChart;

        fn create(&mut self, slot: Slot, _dataset: &ChartDataset) -> AppResult<CountedChart> {
            if self.fail_next {
                self.fail_next = false;
                return Err(ClientError::chart(slot, "boom"));
            }
            let mut live = self.live.borrow_mut();
            live[slot.index()] += 1;
            let mut peak = self.peak.borrow_mut();
            *peak = (*peak).max(live[slot.index()]);
            self.created += 1;
            Ok(CountedChart {
                slot,
                serial: self.created,
            })
        }

        fn snapshot(&self, chart: &CountedChart) -> AppResult<FrozenImage> {
            Ok(FrozenImage {
                media_type: "image/png",
                bytes: vec![chart.serial as u8],
                width: 1,
                height: 1,
            })
        }

        fn release(&mut self, chart: CountedChart) {
            self.live.borrow_mut()[chart.slot.index()] -= 1;
        }
    }

    fn trend() -> ChartDataset {
        ChartDataset::Trend(TimeSeries::new(
            LatLon::new(0.0, 0.0),
            vec![YearValue { year: 2020, ndvi: Some(0.3) }],
        ))
    }

    fn composition() -> ChartDataset {
        ChartDataset::Composition(LandCover {
            mangrove_area_m2: 1.0,
            total_area_m2: 2.0,
        })
    }

    #[test]
    fn test_rebind_never_leaks() {
        let backend = CountingBackend::default();
        let live = backend.live.clone();
        let peak = backend.peak.clone();
        let mut charts = VisualizationLifecycle::new(backend);

        for _ in 0..10 {
            charts.bind(Slot::Trend, trend()).unwrap();
            charts.bind(Slot::Composition, composition()).unwrap();
        }

        assert_eq!(*live.borrow(), [1, 1]);
        assert_eq!(*peak.borrow(), 1);
        assert_eq!(charts.backend().created, 20);
    }

    #[test]
    fn test_render_does_not_touch_instance() {
        let mut charts = VisualizationLifecycle::new(CountingBackend::default());
        assert!(charts.render(Slot::Trend).unwrap().is_none());

        charts.bind(Slot::Trend, trend()).unwrap();
        let first = charts.render(Slot::Trend).unwrap().unwrap();
        let second = charts.render(Slot::Trend).unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(charts.backend().created, 1);
    }

    #[test]
    fn test_clear_leaves_slot_empty() {
        let backend = CountingBackend::default();
        let live = backend.live.clone();
        let mut charts = VisualizationLifecycle::new(backend);

        charts.bind(Slot::Composition, composition()).unwrap();
        charts.clear(Slot::Composition);
        charts.clear(Slot::Composition);

        assert!(!charts.is_bound(Slot::Composition));
        assert_eq!(*live.borrow(), [0, 0]);
    }

    #[test]
    fn test_failed_create_leaves_slot_empty() {
        let backend = CountingBackend::default();
        let live = backend.live.clone();
        let mut charts = VisualizationLifecycle::new(backend);
        charts.bind(Slot::Trend, trend()).unwrap();

        charts.backend.fail_next = true;
        assert!(charts.bind(Slot::Trend, trend()).is_err());

        assert!(!charts.is_bound(Slot::Trend));
        assert_eq!(*live.borrow(), [0, 0]);
    }

    #[test]
    fn test_drop_releases_everything() {
        let backend = CountingBackend::default();
        let live = backend.live.clone();
        {
            let mut charts = VisualizationLifecycle::new(backend);
            charts.bind(Slot::Trend, trend()).unwrap();
            charts.bind(Slot::Composition, composition()).unwrap();
        }
        assert_eq!(*live.borrow(), [0, 0]);
    }

    #[test]
    fn test_data_url_encoding() {
        let image = FrozenImage {
            media_type: "image/svg+xml",
            bytes: b"<svg/>".to_vec(),
            width: 1,
            height: 1,
        };
        assert_eq!(image.to_data_url(), "data:image/svg+xml;base64,PHN2Zy8+");
    }
}
