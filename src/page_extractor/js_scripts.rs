//! JavaScript evaluation scripts
//!
//! This module contains the JavaScript code evaluated inside the scanned
//! page. Each script returns a plain JSON object matching a struct in
//! `schema`.

/// Document readiness and resource count, polled to detect network idle
pub const NETWORK_IDLE_SCRIPT: &str = r"
    (() => ({
        readyState: document.readyState,
        resourceCount: performance.getEntriesByType('resource').length
    }))()
";

/// Navigation timing, paint timing and transferred bytes by resource type
pub const PERFORMANCE_SCRIPT: &str = r"
    (() => {
        const nav = performance.getEntriesByType('navigation')[0] || {};
        const timing = performance.timing || {};
        const start = nav.startTime || 0;
        const legacyLoad = timing.loadEventEnd && timing.navigationStart
            ? timing.loadEventEnd - timing.navigationStart
            : 0;
        const loadEnd = nav.loadEventEnd || legacyLoad;

        const fcpEntry = performance.getEntriesByType('paint')
            .find(entry => entry.name === 'first-contentful-paint');

        const resources = performance.getEntriesByType('resource');
        const bytes = { script: 0, stylesheet: 0, image: 0, font: 0, xhr: 0, other: 0 };
        for (const entry of resources) {
            const size = entry.transferSize || entry.encodedBodySize || 0;
            const kind = entry.initiatorType;
            if (kind === 'script') {
                bytes.script += size;
            } else if (kind === 'css' || (kind === 'link' && /\.css(\?|$)/.test(entry.name))) {
                bytes.stylesheet += size;
            } else if (/\.(woff2?|ttf|otf|eot)(\?|$)/.test(entry.name)) {
                bytes.font += size;
            } else if (kind === 'img' || kind === 'image') {
                bytes.image += size;
            } else if (kind === 'fetch' || kind === 'xmlhttprequest') {
                bytes.xhr += size;
            } else {
                bytes.other += size;
            }
        }

        return {
            loadTime: Math.max(0, loadEnd - start),
            firstContentfulPaint: fcpEntry ? fcpEntry.startTime : 0,
            timeToInteractive: Math.max(0, (nav.domInteractive || 0) - start),
            domContentLoaded: Math.max(0, (nav.domContentLoadedEventEnd || 0) - start),
            domNodes: document.getElementsByTagName('*').length,
            requestCount: resources.length + 1,
            documentBytes: nav.transferSize || nav.encodedBodySize || 0,
            resourceBytes: bytes
        };
    })()
";

/// On-page SEO signals
pub const SEO_SCRIPT: &str = r#"
    (() => {
        const metaContent = name =>
            document.querySelector(`meta[name="${name}"]`)?.getAttribute('content') ?? null;

        const images = Array.from(document.images);
        const origin = window.location.origin;
        let internalLinks = 0;
        let externalLinks = 0;
        document.querySelectorAll('a[href]').forEach(anchor => {
            const raw = (anchor.getAttribute('href') || '').trim().toLowerCase();
            if (!raw || raw.startsWith('#') || raw.startsWith('javascript:')
                || raw.startsWith('mailto:') || raw.startsWith('tel:')) {
                return;
            }
            try {
                if (new URL(anchor.href).origin === origin) {
                    internalLinks++;
                } else {
                    externalLinks++;
                }
            } catch (e) {}
        });

        return {
            title: document.title || null,
            metaDescription: metaContent('description'),
            h1Count: document.querySelectorAll('h1').length,
            h2Count: document.querySelectorAll('h2').length,
            h3Count: document.querySelectorAll('h3').length,
            imagesTotal: images.length,
            imagesMissingAlt: images.filter(img => !(img.getAttribute('alt') || '').trim()).length,
            internalLinks,
            externalLinks,
            hasViewport: document.querySelector('meta[name="viewport"]') !== null,
            canonical: document.querySelector('link[rel="canonical"]')?.href ?? null,
            lang: document.documentElement.lang || null
        };
    })()
"#;

/// Plain-HTTP subresources referenced from an HTTPS page
pub const MIXED_CONTENT_SCRIPT: &str = r"
    (() => {
        if (window.location.protocol !== 'https:') {
            return [];
        }
        const found = [];
        const collect = (selector, attribute, kind) => {
            document.querySelectorAll(selector).forEach(element => {
                const value = (element.getAttribute(attribute) || '').trim();
                if (value.toLowerCase().startsWith('http://')) {
                    found.push({ kind, url: value });
                }
            });
        };
        collect('img[src]', 'src', 'image');
        collect('script[src]', 'src', 'script');
        collect('link[href]', 'href', 'link');
        collect('iframe[src]', 'src', 'iframe');
        return found;
    })()
";

/// Structural page signals for content, UX and engagement heuristics
pub const PAGE_STRUCTURE_SCRIPT: &str = r#"
    (() => {
        const textOf = element => (element.textContent || '').trim();
        const bodyText = document.body ? (document.body.innerText || '') : '';

        const ctaPattern = /\b(buy|get|start|sign ?up|subscribe|contact|book|try|download|join|register|learn more|shop|order|request)\b/i;
        const ctas = Array.from(document.querySelectorAll('button, a[href], input[type="submit"]'))
            .filter(element => ctaPattern.test(textOf(element) || element.value || ''));

        const forms = Array.from(document.forms);
        const hasContactForm = forms.some(form => {
            const haystack = `${form.id} ${form.className} ${form.getAttribute('action') || ''}`.toLowerCase();
            return /contact|message|enquiry|inquiry/.test(haystack)
                || form.querySelector('textarea, input[type="email"]') !== null;
        });

        const socialHosts = ['facebook.com', 'twitter.com', 'x.com', 'linkedin.com', 'instagram.com',
            'youtube.com', 'tiktok.com', 'pinterest.com', 'github.com'];
        const socialLinks = new Set();
        document.querySelectorAll('a[href]').forEach(anchor => {
            try {
                const host = new URL(anchor.href).hostname.replace(/^www\./, '');
                const match = socialHosts.find(social => host === social || host.endsWith('.' + social));
                if (match) {
                    socialLinks.add(match);
                }
            } catch (e) {}
        });

        const images = Array.from(document.images);

        return {
            title: document.title || null,
            metaDescription: document.querySelector('meta[name="description"]')?.getAttribute('content') ?? null,
            headings: Array.from(document.querySelectorAll('h1, h2, h3')).slice(0, 20).map(heading => ({
                level: parseInt(heading.tagName.substring(1), 10),
                text: textOf(heading).slice(0, 120)
            })),
            h1Count: document.querySelectorAll('h1').length,
            h2Count: document.querySelectorAll('h2').length,
            paragraphCount: Array.from(document.querySelectorAll('p')).filter(p => textOf(p).length > 20).length,
            wordCount: bodyText.split(/\s+/).filter(Boolean).length,
            ctaCount: ctas.length,
            ctaTexts: ctas.slice(0, 10).map(element => (textOf(element) || element.value || '').slice(0, 60)),
            formCount: forms.length,
            hasContactForm,
            imageCount: images.length,
            imagesMissingAlt: images.filter(img => !(img.getAttribute('alt') || '').trim()).length,
            hasNavigation: document.querySelector('nav, [role="navigation"]') !== null,
            hasEmail: document.querySelector('a[href^="mailto:"]') !== null
                || /[\w.+-]+@[\w-]+\.[\w.]+/.test(bodyText),
            hasPhone: document.querySelector('a[href^="tel:"]') !== null
                || /\+?\d[\d\s().-]{7,}\d/.test(bodyText),
            socialLinks: Array.from(socialLinks),
            hasViewport: document.querySelector('meta[name="viewport"]') !== null
        };
    })()
"#;
