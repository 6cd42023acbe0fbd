//! CSS样式管理模块

/// 回执页面样式
pub fn receipt_css() -> &'static str {
    r#"
        :root {
            --background: #0a0a0a;
            --foreground: #ededed;
            --muted: #8a8a8a;
            --accent: #22c55e;
            --border: #262626;
        }
        * { box-sizing: border-box; }
        body {
            margin: 0;
            background: var(--background);
            color: var(--foreground);
            font-family: ui-sans-serif, system-ui, -apple-system, 'Segoe UI', sans-serif;
            -webkit-font-smoothing: antialiased;
        }
        .mono { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; }
        section {
            position: relative;
            display: flex;
            flex-direction: column;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            padding: 6rem 1.5rem;
        }
        .hero-title {
            max-width: 56rem;
            margin: 0;
            text-align: center;
            font-size: clamp(2.25rem, 6vw, 4.5rem);
            font-weight: 700;
            letter-spacing: -0.05em;
        }
        .hero-sub {
            max-width: 42rem;
            margin: 2rem auto 0;
            text-align: center;
            font-size: 0.95rem;
            line-height: 1.7;
            color: var(--muted);
        }
        .built-with {
            position: absolute;
            right: 2rem;
            bottom: 2rem;
            font-size: 0.75rem;
            color: var(--muted);
        }
        a { color: var(--foreground); text-underline-offset: 2px; }
        a:hover { color: var(--muted); }
        .receipt {
            width: 100%;
            max-width: 42rem;
            padding: 2rem;
            border: 1px solid var(--border);
            background: rgba(10, 10, 10, 0.5);
        }
        .receipt-label {
            display: block;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
            font-size: 0.75rem;
            letter-spacing: 0.2em;
            text-transform: uppercase;
            color: var(--muted);
        }
        .row {
            display: flex;
            flex-wrap: wrap;
            justify-content: space-between;
            gap: 0.25rem 1rem;
            margin: 1rem 0;
            font-size: 0.875rem;
        }
        .row .key { color: var(--muted); }
        .row .value { word-break: break-all; }
        .row .pass { font-weight: 700; color: var(--accent); }
        .divider { margin: 1.5rem 0; border-top: 1px solid var(--border); }
        .copy {
            margin-left: 0.5rem;
            padding: 0.1rem 0.5rem;
            border: 1px solid var(--border);
            background: transparent;
            color: var(--muted);
            font-size: 0.7rem;
            cursor: pointer;
        }
        .actions { display: flex; flex-wrap: wrap; gap: 0.75rem; margin-top: 2.5rem; }
        .button {
            display: inline-flex;
            align-items: center;
            justify-content: center;
            padding: 0.75rem 1rem;
            border: 1px solid #404040;
            font-size: 0.75rem;
            letter-spacing: 0.05em;
            text-transform: uppercase;
            text-decoration: none;
        }
        .button:hover { border-color: #737373; background: #171717; }
        .button.disabled { border-color: var(--border); color: var(--muted); cursor: not-allowed; }
        .button.disabled:hover { background: transparent; }
        .quote {
            max-width: 48rem;
            margin: 0;
            text-align: center;
            font-size: clamp(1.5rem, 3.5vw, 2.25rem);
            font-weight: 500;
            line-height: 1.5;
            letter-spacing: -0.02em;
        }
    "#
}

/// 复制按钮脚本
pub fn copy_script() -> &'static str {
    r#"
        document.querySelectorAll('[data-copy]').forEach(function (button) {
            button.addEventListener('click', function () {
                if (!navigator.clipboard) { return; }
                navigator.clipboard.writeText(button.getAttribute('data-copy')).then(function () {
                    button.textContent = 'COPIED';
                    setTimeout(function () { button.textContent = 'COPY'; }, 1500);
                });
            });
        });
    "#
}
