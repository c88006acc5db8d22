//! Page truncation demonstration for easy-truncation
//! easy-truncation 页面截断演示程序
//! 功能说明：
//! 1. 解析一段带 data-truncate-* 属性的 HTML，初始化所有截断容器
//! 2. 通过事件通道模拟窗口缩放与点击，观察折叠 / 展开后的标记
//!
//! 运行命令：
//! cargo run --example page_demo

use easy_truncation::{
    drive, Document, Dom, PageEnvironment, PageEvent, TruncationPage, WidgetConfig,
};
use env_logger::{Builder, Env, Target};
use std::error::Error;
use tokio::sync::mpsc;

const DEMO_HTML: &str = r##"<article>
<section id="posts" data-truncate-max-items="2" data-truncate-exclude=".entry-meta" data-truncate-collapsible><p>First</p><p class="entry-meta">meta</p><p>Second</p><p>Third</p><p>Fourth</p></section>
<div id="bio" data-truncate-char-limit="20" data-truncate-auto-display="1200"><p>The quick brown fox jumps over the lazy dog</p></div>
</article>"##;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // ========== 1. 日志系统初始化 ==========
    Builder::from_env(Env::default().default_filter_or("debug"))
        .target(Target::Stdout)
        .init();

    // ========== 2. 初始化页面 ==========
    let widget = WidgetConfig::from_json(r#"{"link_text": "Show More"}"#)?;
    let page = TruncationPage::init(Document::parse(DEMO_HTML)?, widget, PageEnvironment::new(1280))?;
    println!("初始标记:\n{}\n", page.dom().to_html());

    let posts = page.dom().select_first("#posts")?.ok_or("missing #posts")?;
    let link = page
        .controller_for(posts)
        .and_then(|c| c.affordance())
        .map(|a| a.link())
        .ok_or("missing affordance")?;

    // ========== 3. 模拟缩放与点击 ==========
    let (tx, rx) = mpsc::unbounded_channel();
    for width in [1100, 900, 800] {
        tx.send(PageEvent::Resize(width))?;
    }
    tx.send(PageEvent::Tap {
        target: link,
        event: page.tap_event().name().to_string(),
    })?;
    drop(tx);

    let page = drive(page, rx).await;
    println!("结算次数: {}", page.settled_ticks());
    println!("最终标记:\n{}", page.dom().to_html());
    println!("文章全文: {}", page.dom().text_content(posts));
    Ok(())
}
