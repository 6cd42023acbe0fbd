//! 构建回执页面生成模块
//! 将 [`BuildMeta`] 渲染为独立的 HTML 文档

pub mod styles;

use crate::provenance::{timestamp, BuildMeta, UNKNOWN};
use crate::util::config::PageConfig;
use crate::util::logging::standards::events;
use anyhow::{Context, Result};
use build_html::{Html, HtmlContainer, HtmlPage};
use std::path::Path;

/// 回执页面生成器
pub struct ReceiptPageGenerator;

impl ReceiptPageGenerator {
    /// 生成完整页面
    pub fn render(meta: &BuildMeta, page: &PageConfig) -> String {
        let title = escape_html(&page.title);
        let description = escape_html(&page.description);

        let mut html = HtmlPage::new()
            .with_title(&title)
            .with_meta(vec![("charset", "utf-8")])
            .with_meta(vec![
                ("name", "viewport"),
                ("content", "width=device-width, initial-scale=1"),
            ])
            .with_meta(vec![("name", "description"), ("content", description.as_str())])
            .with_meta(vec![("name", "robots"), ("content", "index, follow")])
            .with_meta(vec![("property", "og:title"), ("content", title.as_str())])
            .with_meta(vec![
                ("property", "og:description"),
                ("content", description.as_str()),
            ])
            .with_meta(vec![("property", "og:type"), ("content", "website")])
            .with_meta(vec![("name", "twitter:card"), ("content", "summary_large_image")])
            .with_meta(vec![("name", "twitter:title"), ("content", title.as_str())])
            .with_meta(vec![
                ("name", "twitter:description"),
                ("content", description.as_str()),
            ])
            .with_style(styles::receipt_css());

        html.add_raw("<main>");
        html.add_raw(&Self::hero_section(page));
        html.add_raw(&Self::receipt_section(meta, page));
        html.add_raw(
            "<section><p class=\"quote\">&ldquo;If this build failed, this page would not exist.&rdquo;</p></section>",
        );
        html.add_raw("</main>");
        html.add_raw(&format!("<script>{}</script>", styles::copy_script()));

        let output = html.to_html_string();
        tracing::debug!(
            event = events::PAGE_RENDERED,
            bytes = output.len(),
            commit = %meta.commit_sha_short
        );
        output
    }

    /// 渲染并写入文件，目录不存在时自动创建
    pub fn write_to_file(meta: &BuildMeta, page: &PageConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("创建输出目录失败: {}", parent.display()))?;
        }

        let content = Self::render(meta, page);
        std::fs::write(path, content.as_bytes())
            .with_context(|| format!("写入页面失败: {}", path.display()))?;

        tracing::info!(
            event = events::PAGE_WRITTEN,
            path = %path.display(),
            bytes = content.len()
        );
        Ok(())
    }

    fn hero_section(page: &PageConfig) -> String {
        format!(
            concat!(
                "<section>",
                "<h1 class=\"hero-title\">THIS APP EXISTS<br>BECAUSE A REPO BUILT IT.</h1>",
                "<p class=\"hero-sub mono\">No prompts. No templates. No edits.<br>",
                "This deployment is the direct output of a real repository build.</p>",
                "<div class=\"built-with mono\">Built with {}</div>",
                "</section>"
            ),
            Self::link_or_text(&page.factory_url, &page.factory_name, "")
        )
    }

    fn receipt_section(meta: &BuildMeta, page: &PageConfig) -> String {
        let mut rows = String::new();

        rows.push_str(&Self::row_html(
            "REPO_URL",
            &Self::link_or_text(&meta.repo_url, &meta.repo_url, ""),
        ));
        rows.push_str(&Self::row("REPO_SLUG", &meta.repo_slug));

        let copy = if meta.commit_sha == UNKNOWN {
            String::new()
        } else {
            format!(
                "<button type=\"button\" class=\"copy mono\" data-copy=\"{}\">COPY</button>",
                escape_html(&meta.commit_sha)
            )
        };
        rows.push_str(&Self::row_html(
            "COMMIT_SHA",
            &format!("{}{}", escape_html(&meta.commit_sha_short), copy),
        ));

        if let Some(build_id) = &meta.build_id {
            rows.push_str(&Self::row("BUILD_ID", build_id));
        }
        rows.push_str(&Self::row(
            "BUILD_TIMESTAMP",
            &timestamp::normalize(&meta.build_timestamp),
        ));
        if let Some(build_hash) = &meta.build_hash {
            rows.push_str(&Self::row("BUILD_HASH", build_hash));
        }

        rows.push_str("<div class=\"divider\"></div>");
        rows.push_str(&Self::row_html(
            "PROOF_GATE",
            &format!("<span class=\"pass\">{}</span>", escape_html(meta.proof_gate)),
        ));
        rows.push_str(&Self::row("DEPLOYMENT_STATUS", meta.deployment_status));
        rows.push_str(&Self::row("DEPLOYED_VIA", meta.deployed_via));

        let commit_button = if is_browsable(&meta.commit_url) {
            format!(
                "<a class=\"button mono\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">View Source Commit</a>",
                escape_html(&meta.commit_url)
            )
        } else {
            "<span class=\"button mono disabled\" aria-disabled=\"true\">View Source Commit</span>"
                .to_string()
        };
        let factory_button = Self::link_or_text(
            &page.factory_url,
            &format!("Open {}", page.factory_name),
            "button mono",
        );

        format!(
            concat!(
                "<section><div class=\"receipt\">",
                "<span class=\"receipt-label mono\">Build Receipt</span>",
                "<div class=\"mono\">{}</div>",
                "<div class=\"actions\">{}{}</div>",
                "</div></section>"
            ),
            rows, commit_button, factory_button
        )
    }

    fn row(label: &str, value: &str) -> String {
        Self::row_html(label, &escape_html(value))
    }

    /// value_html 必须已转义
    fn row_html(label: &str, value_html: &str) -> String {
        format!(
            "<div class=\"row\"><span class=\"key\">{}</span><span class=\"value\">{}</span></div>",
            escape_html(label),
            value_html
        )
    }

    /// 仅 http(s) 地址渲染为链接，其余（含 UNKNOWN）渲染为纯文本
    fn link_or_text(href: &str, text: &str, class: &str) -> String {
        let class_attr = if class.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", class)
        };

        if is_browsable(href) {
            format!(
                "<a{} href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                class_attr,
                escape_html(href),
                escape_html(text)
            )
        } else if class.is_empty() {
            format!("<span>{}</span>", escape_html(text))
        } else {
            format!(
                "<span class=\"{} disabled\" aria-disabled=\"true\">{}</span>",
                class,
                escape_html(text)
            )
        }
    }
}

fn is_browsable(url: &str) -> bool {
    url != UNKNOWN && (url.starts_with("https://") || url.starts_with("http://"))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
